use crate::{Hash256, PublicKeyBytes, SignatureBytes};

/// Verifies aggregate BLS signatures on behalf of the state transition.
///
/// Implementations must be deterministic and free of side effects; the same inputs always produce
/// the same answer on every node.
pub trait SignatureVerifier: Sync {
    /// Returns `true` if `signature` is a valid aggregate signature of `message` by every key in
    /// `pubkeys`.
    ///
    /// Returns `false` when `pubkeys` is empty or when any of the points fail to decompress.
    fn fast_aggregate_verify(
        &self,
        pubkeys: &[PublicKeyBytes],
        message: Hash256,
        signature: &SignatureBytes,
    ) -> bool;
}

/// A verifier which considers every signature valid.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeVerifier;

impl SignatureVerifier for FakeVerifier {
    fn fast_aggregate_verify(
        &self,
        _pubkeys: &[PublicKeyBytes],
        _message: Hash256,
        _signature: &SignatureBytes,
    ) -> bool {
        true
    }
}

impl<T: SignatureVerifier + ?Sized> SignatureVerifier for &T {
    fn fast_aggregate_verify(
        &self,
        pubkeys: &[PublicKeyBytes],
        message: Hash256,
        signature: &SignatureBytes,
    ) -> bool {
        (**self).fast_aggregate_verify(pubkeys, message, signature)
    }
}
