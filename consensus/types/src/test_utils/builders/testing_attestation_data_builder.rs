use crate::*;

/// Builds an `AttestationData` to be used for testing purposes.
///
/// This struct should **never be used for production purposes.**
pub struct TestingAttestationDataBuilder {
    data: AttestationData,
}

impl TestingAttestationDataBuilder {
    /// Configures a new `AttestationData` which attests to all of the same parameters as the
    /// state.
    ///
    /// The `state` must be past `slot`, so the block root at `slot` is known.
    pub fn new<T: EthSpec>(state: &BeaconState<T>, index: u64, slot: Slot) -> Self {
        let slots_per_epoch = T::slots_per_epoch();
        let current_epoch = state.current_epoch();
        let previous_epoch = state.previous_epoch();

        let is_previous_epoch = slot.epoch(slots_per_epoch) != current_epoch;

        let source = if is_previous_epoch {
            state.previous_justified_checkpoint
        } else {
            state.current_justified_checkpoint
        };

        let target_epoch = if is_previous_epoch {
            previous_epoch
        } else {
            current_epoch
        };

        let target = Checkpoint {
            epoch: target_epoch,
            root: *state
                .get_block_root(target_epoch.start_slot(slots_per_epoch))
                .expect("state must be past the target epoch start"),
        };

        let data = AttestationData {
            slot,
            index,

            // LMD GHOST vote
            beacon_block_root: *state
                .get_block_root(slot)
                .expect("state must be past the attestation slot"),

            // FFG Vote
            source,
            target,
        };

        Self { data }
    }

    /// Returns the `AttestationData`, consuming the builder.
    pub fn build(self) -> AttestationData {
        self.data
    }
}
