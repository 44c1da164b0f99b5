use super::errors::EpochProcessingError as Error;
use super::validator_statuses::TotalBalances;
use safe_arith::SafeArith;
use std::ops::Range;
use types::{BeaconState, BeaconStateError, BitVector, Checkpoint, Epoch, EthSpec, Hash256};

/// This is a subset of the `BeaconState` which is used to compute justification and finality
/// without modifying the `BeaconState`.
///
/// A `JustificationAndFinalizationState` can be created from a `BeaconState` to compute
/// justification/finality changes and then applied to a `BeaconState` to enshrine those changes.
#[must_use = "this value must be applied to a state or explicitly dropped"]
#[derive(Debug, Clone, PartialEq)]
pub struct JustificationAndFinalizationState<T: EthSpec> {
    /*
     * Immutable fields.
     */
    previous_epoch: Epoch,
    previous_epoch_target_root: Result<Hash256, BeaconStateError>,
    current_epoch: Epoch,
    current_epoch_target_root: Result<Hash256, BeaconStateError>,
    /*
     * Mutable fields.
     */
    previous_justified_checkpoint: Checkpoint,
    current_justified_checkpoint: Checkpoint,
    finalized_checkpoint: Checkpoint,
    justification_bits: BitVector<T::JustificationBitsLength>,
}

impl<T: EthSpec> JustificationAndFinalizationState<T> {
    pub fn new(state: &BeaconState<T>) -> Self {
        let previous_epoch = state.previous_epoch();
        let current_epoch = state.current_epoch();
        Self {
            previous_epoch,
            previous_epoch_target_root: state.get_block_root_at_epoch(previous_epoch).copied(),
            current_epoch,
            current_epoch_target_root: state.get_block_root_at_epoch(current_epoch).copied(),
            previous_justified_checkpoint: state.previous_justified_checkpoint,
            current_justified_checkpoint: state.current_justified_checkpoint,
            finalized_checkpoint: state.finalized_checkpoint,
            justification_bits: state.justification_bits.clone(),
        }
    }

    pub fn apply_changes_to_state(self, state: &mut BeaconState<T>) {
        let Self {
            /*
             * Immutable fields do not need to be used.
             */
            previous_epoch: _,
            previous_epoch_target_root: _,
            current_epoch: _,
            current_epoch_target_root: _,
            /*
             * Mutable fields *must* be used.
             */
            previous_justified_checkpoint,
            current_justified_checkpoint,
            finalized_checkpoint,
            justification_bits,
        } = self;

        state.previous_justified_checkpoint = previous_justified_checkpoint;
        state.current_justified_checkpoint = current_justified_checkpoint;
        state.finalized_checkpoint = finalized_checkpoint;
        state.justification_bits = justification_bits;
    }

    pub fn previous_epoch(&self) -> Epoch {
        self.previous_epoch
    }

    pub fn current_epoch(&self) -> Epoch {
        self.current_epoch
    }

    pub fn get_block_root_at_epoch(&self, epoch: Epoch) -> Result<Hash256, BeaconStateError> {
        if epoch == self.previous_epoch {
            self.previous_epoch_target_root.clone()
        } else if epoch == self.current_epoch {
            self.current_epoch_target_root.clone()
        } else {
            Err(BeaconStateError::SlotOutOfBounds)
        }
    }

    pub fn previous_justified_checkpoint(&self) -> Checkpoint {
        self.previous_justified_checkpoint
    }

    pub fn current_justified_checkpoint(&self) -> Checkpoint {
        self.current_justified_checkpoint
    }

    pub fn finalized_checkpoint(&self) -> Checkpoint {
        self.finalized_checkpoint
    }

    pub fn justification_bits(&self) -> &BitVector<T::JustificationBitsLength> {
        &self.justification_bits
    }

    /// Returns `true` if every bit in `range` is set.
    fn all_bits_set(&self, range: Range<usize>) -> Result<bool, Error> {
        for i in range {
            if !self
                .justification_bits
                .get(i)
                .map_err(Error::InvalidJustificationBit)?
            {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn set_bit(&mut self, i: usize) -> Result<(), Error> {
        self.justification_bits
            .set(i, true)
            .map_err(Error::InvalidJustificationBit)
    }
}

/// Update the justified and finalized checkpoints for matching target attestations.
///
/// Does nothing during the first two epochs.
pub fn process_justification_and_finalization<T: EthSpec>(
    state: &BeaconState<T>,
    total_balances: &TotalBalances,
) -> Result<JustificationAndFinalizationState<T>, Error> {
    let justification_and_finalization_state = JustificationAndFinalizationState::new(state);

    if state.current_epoch() <= T::genesis_epoch().safe_add(1)? {
        return Ok(justification_and_finalization_state);
    }

    weigh_justification_and_finalization(
        justification_and_finalization_state,
        total_balances.current_epoch(),
        total_balances.previous_epoch_target_attesters(),
        total_balances.current_epoch_target_attesters(),
    )
}

/// Apply the supermajority test to the target stakes and update finality.
///
/// The finality rules are checked against the checkpoints from before this call. When more than
/// one rule matches, the last one wins.
pub fn weigh_justification_and_finalization<T: EthSpec>(
    mut state: JustificationAndFinalizationState<T>,
    total_active_balance: u64,
    previous_target_balance: u64,
    current_target_balance: u64,
) -> Result<JustificationAndFinalizationState<T>, Error> {
    let previous_epoch = state.previous_epoch();
    let current_epoch = state.current_epoch();

    let old_previous_justified_checkpoint = state.previous_justified_checkpoint();
    let old_current_justified_checkpoint = state.current_justified_checkpoint();

    // Process justifications
    state.previous_justified_checkpoint = state.current_justified_checkpoint;
    state
        .justification_bits
        .shift_up(1)
        .map_err(Error::InvalidJustificationBit)?;

    if previous_target_balance.safe_mul(3)? >= total_active_balance.safe_mul(2)? {
        state.current_justified_checkpoint = Checkpoint {
            epoch: previous_epoch,
            root: state.get_block_root_at_epoch(previous_epoch)?,
        };
        state.set_bit(1)?;
    }
    // If the current epoch gets justified, fill the last bit.
    if current_target_balance.safe_mul(3)? >= total_active_balance.safe_mul(2)? {
        state.current_justified_checkpoint = Checkpoint {
            epoch: current_epoch,
            root: state.get_block_root_at_epoch(current_epoch)?,
        };
        state.set_bit(0)?;
    }

    // The 2nd/3rd/4th most recent epochs are all justified, the 2nd using the 4th as source.
    if state.all_bits_set(1..4)?
        && old_previous_justified_checkpoint.epoch.safe_add(3)? == current_epoch
    {
        state.finalized_checkpoint = old_previous_justified_checkpoint;
    }
    // The 2nd/3rd most recent epochs are both justified, the 2nd using the 3rd as source.
    if state.all_bits_set(1..3)?
        && old_previous_justified_checkpoint.epoch.safe_add(2)? == current_epoch
    {
        state.finalized_checkpoint = old_previous_justified_checkpoint;
    }
    // The 1st/2nd/3rd most recent epochs are all justified, the 1st using the 3rd as source.
    if state.all_bits_set(0..3)?
        && old_current_justified_checkpoint.epoch.safe_add(2)? == current_epoch
    {
        state.finalized_checkpoint = old_current_justified_checkpoint;
    }
    // The 1st/2nd most recent epochs are both justified, the 1st using the 2nd as source.
    if state.all_bits_set(0..2)?
        && old_current_justified_checkpoint.epoch.safe_add(1)? == current_epoch
    {
        state.finalized_checkpoint = old_current_justified_checkpoint;
    }

    Ok(state)
}
