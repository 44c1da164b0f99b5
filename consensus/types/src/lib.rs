//! Ethereum 2.0 types

// Required for big type-level numbers
#![recursion_limit = "128"]

#[macro_use]
mod slot_epoch_macros;
pub mod test_utils;

pub mod attestation;
pub mod attestation_data;
pub mod beacon_committee;
pub mod beacon_state;
pub mod chain_spec;
pub mod checkpoint;
pub mod eth_spec;
pub mod fork;
pub mod fork_data;
pub mod indexed_attestation;
pub mod pending_attestation;
pub mod relative_epoch;
pub mod serde_utils;
pub mod signing_data;
pub mod slot_epoch;
pub mod validator;

pub use crate::attestation::Attestation;
pub use crate::attestation_data::AttestationData;
pub use crate::beacon_committee::BeaconCommittee;
pub use crate::beacon_state::{Error as BeaconStateError, *};
pub use crate::chain_spec::{ChainSpec, Domain};
pub use crate::checkpoint::Checkpoint;
pub use crate::eth_spec::*;
pub use crate::fork::Fork;
pub use crate::fork_data::ForkData;
pub use crate::indexed_attestation::IndexedAttestation;
pub use crate::pending_attestation::PendingAttestation;
pub use crate::relative_epoch::{Error as RelativeEpochError, RelativeEpoch};
pub use crate::signing_data::{SignedRoot, SigningData};
pub use crate::slot_epoch::{Epoch, Slot};
pub use crate::validator::Validator;

pub type CommitteeIndex = u64;
pub type Hash256 = ethereum_types::H256;

pub use bls::{PublicKeyBytes, SignatureBytes};
pub use ssz_types::{typenum, typenum::Unsigned, BitList, BitVector, FixedVector, VariableList};
