use crate::{Error, Hash256, PublicKeyBytes, SignatureBytes, SignatureVerifier};
pub use blst::min_pk as blst_core;
use blst::BLST_ERROR;

/// Domain separation tag for the proof-of-possession ciphersuite.
pub const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

/// Decompresses `bytes` into a public key, checking that it is a valid, non-infinity point in the
/// correct subgroup.
pub fn decompress_public_key(bytes: &PublicKeyBytes) -> Result<blst_core::PublicKey, Error> {
    blst_core::PublicKey::key_validate(bytes.as_bytes()).map_err(Into::into)
}

/// Decompresses `bytes` into a signature. Subgroup checks are deferred to verification.
pub fn decompress_signature(bytes: &SignatureBytes) -> Result<blst_core::Signature, Error> {
    blst_core::Signature::uncompress(bytes.as_bytes()).map_err(Into::into)
}

/// Verifies signatures with the Supranational `blst` library.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlstVerifier;

impl SignatureVerifier for BlstVerifier {
    fn fast_aggregate_verify(
        &self,
        pubkeys: &[PublicKeyBytes],
        message: Hash256,
        signature: &SignatureBytes,
    ) -> bool {
        if pubkeys.is_empty() {
            return false;
        }

        let signature = match decompress_signature(signature) {
            Ok(signature) => signature,
            Err(_) => return false,
        };

        let pubkeys = match pubkeys
            .iter()
            .map(decompress_public_key)
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(pubkeys) => pubkeys,
            Err(_) => return false,
        };
        let pubkey_refs = pubkeys.iter().collect::<Vec<_>>();

        signature.fast_aggregate_verify(true, message.as_bytes(), DST, &pubkey_refs)
            == BLST_ERROR::BLST_SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{aggregate_signatures, generate_deterministic_keypairs};

    fn message() -> Hash256 {
        Hash256::from_low_u64_be(42)
    }

    #[test]
    fn verifies_single_signature() {
        let keypairs = generate_deterministic_keypairs(1);
        let signature = keypairs[0].sign(message());

        assert!(BlstVerifier.fast_aggregate_verify(&[keypairs[0].pk], message(), &signature));
        assert!(!BlstVerifier.fast_aggregate_verify(
            &[keypairs[0].pk],
            Hash256::from_low_u64_be(43),
            &signature
        ));
    }

    #[test]
    fn verifies_aggregate_signature() {
        let keypairs = generate_deterministic_keypairs(4);
        let signatures = keypairs
            .iter()
            .map(|kp| kp.sign(message()))
            .collect::<Vec<_>>();
        let aggregate = aggregate_signatures(&signatures).unwrap();
        let pubkeys = keypairs.iter().map(|kp| kp.pk).collect::<Vec<_>>();

        assert!(BlstVerifier.fast_aggregate_verify(&pubkeys, message(), &aggregate));
        // Dropping a signer must invalidate the aggregate.
        assert!(!BlstVerifier.fast_aggregate_verify(&pubkeys[1..], message(), &aggregate));
    }

    #[test]
    fn rejects_empty_and_malformed_inputs() {
        let keypairs = generate_deterministic_keypairs(1);
        let signature = keypairs[0].sign(message());

        assert!(!BlstVerifier.fast_aggregate_verify(&[], message(), &signature));
        assert!(!BlstVerifier.fast_aggregate_verify(
            &[PublicKeyBytes::empty()],
            message(),
            &signature
        ));
        assert!(!BlstVerifier.fast_aggregate_verify(
            &[keypairs[0].pk],
            message(),
            &SignatureBytes::empty()
        ));
    }
}
