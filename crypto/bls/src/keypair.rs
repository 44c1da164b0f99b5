use crate::impls::blst::{blst_core, decompress_signature, DST};
use crate::{Error, Hash256, PublicKeyBytes, SignatureBytes};
use ethereum_hashing::hash;

/// A BLS secret key and its compressed public key.
#[derive(Clone)]
pub struct Keypair {
    pub sk: blst_core::SecretKey,
    pub pk: PublicKeyBytes,
}

impl Keypair {
    /// Derives a keypair from `ikm`, which must be at least 32 bytes.
    pub fn from_ikm(ikm: &[u8]) -> Result<Self, Error> {
        let sk = blst_core::SecretKey::key_gen(ikm, &[])?;
        let pk = PublicKeyBytes::from(sk.sk_to_pk().compress());
        Ok(Self { sk, pk })
    }

    pub fn sign(&self, message: Hash256) -> SignatureBytes {
        SignatureBytes::from(self.sk.sign(message.as_bytes(), DST, &[]).compress())
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Keypair").field("pk", &self.pk).finish()
    }
}

/// Returns the keypair for `validator_index`, derived from the hash of its little-endian index.
///
/// These keys are public knowledge and must only be used for testing.
pub fn generate_deterministic_keypair(validator_index: usize) -> Result<Keypair, Error> {
    let ikm = hash(&(validator_index as u64).to_le_bytes());
    Keypair::from_ikm(&ikm)
}

/// Returns `count` deterministic keypairs, starting at validator index zero.
///
/// Returns an empty list if key derivation fails, which cannot happen for 32-byte key material.
pub fn generate_deterministic_keypairs(count: usize) -> Vec<Keypair> {
    (0..count)
        .map(generate_deterministic_keypair)
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_default()
}

/// Aggregates `signatures` into a single signature.
pub fn aggregate_signatures(signatures: &[SignatureBytes]) -> Result<SignatureBytes, Error> {
    if signatures.is_empty() {
        return Err(Error::EmptyAggregate);
    }

    let points = signatures
        .iter()
        .map(decompress_signature)
        .collect::<Result<Vec<_>, _>>()?;
    let point_refs = points.iter().collect::<Vec<_>>();

    let aggregate = blst_core::AggregateSignature::aggregate(&point_refs, false)?;
    Ok(SignatureBytes::from(aggregate.to_signature().compress()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_keypairs_are_stable_and_distinct() {
        let a = generate_deterministic_keypairs(3);
        let b = generate_deterministic_keypairs(3);

        assert_eq!(a.len(), 3);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.pk, y.pk);
        }
        assert_ne!(a[0].pk, a[1].pk);
        assert_ne!(a[1].pk, a[2].pk);
    }

    #[test]
    fn short_ikm_is_rejected() {
        assert!(Keypair::from_ikm(&[1; 16]).is_err());
    }

    #[test]
    fn empty_aggregate_is_rejected() {
        assert_eq!(aggregate_signatures(&[]), Err(Error::EmptyAggregate));
    }
}
