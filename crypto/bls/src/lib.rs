//! BLS12-381 support for the state transition.
//!
//! The state transition never touches curve points directly. Public keys and signatures are
//! carried as raw bytes (`PublicKeyBytes`, `SignatureBytes`) and only decompressed inside a
//! `SignatureVerifier` implementation:
//!
//! - `BlstVerifier`: verifies signatures with the `blst` library.
//! - `FakeVerifier`: accepts every signature. Useful for benchmarks and for tests which construct
//!   attestations without signing them.

#[macro_use]
mod macros;
mod impls;
mod keypair;
mod public_key_bytes;
mod signature_bytes;
mod verifier;

pub use impls::blst::{BlstVerifier, DST};
pub use keypair::{
    aggregate_signatures, generate_deterministic_keypair, generate_deterministic_keypairs, Keypair,
};
pub use public_key_bytes::PublicKeyBytes;
pub use signature_bytes::SignatureBytes;
pub use verifier::{FakeVerifier, SignatureVerifier};

use blst::BLST_ERROR;

pub type Hash256 = ethereum_types::H256;

/// The byte-length of a BLS public key when serialized in compressed form.
pub const PUBLIC_KEY_BYTES_LEN: usize = 48;
/// The byte-length of a BLS signature when serialized in compressed form.
pub const SIGNATURE_BYTES_LEN: usize = 96;

#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// An error was raised from the Supranational BLST BLS library.
    BlstError(BLST_ERROR),
    /// The provided bytes were an incorrect length.
    InvalidByteLength { got: usize, expected: usize },
    /// The provided string was not valid hex.
    InvalidHex(hex::FromHexError),
    /// There were no signatures to aggregate.
    EmptyAggregate,
}

impl From<BLST_ERROR> for Error {
    fn from(e: BLST_ERROR) -> Error {
        Error::BlstError(e)
    }
}
