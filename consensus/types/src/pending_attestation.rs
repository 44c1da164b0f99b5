use crate::{AttestationData, BitList, EthSpec};

use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use tree_hash_derive::TreeHash;

/// An attestation that has been included in the state but not yet fully processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode, TreeHash)]
#[serde(bound = "T: EthSpec")]
pub struct PendingAttestation<T: EthSpec> {
    pub aggregation_bits: BitList<T::MaxValidatorsPerCommittee>,
    pub data: AttestationData,
    /// Slots between `data.slot` and the slot of the block that included the attestation.
    pub inclusion_delay: u64,
    /// The proposer of the block that included the attestation.
    pub proposer_index: u64,
}
