use super::errors::EpochProcessingError;
use safe_arith::SafeArith;
use types::{BeaconState, ChainSpec, EthSpec, VariableList};

/// Finish the epoch: refresh the active index root, carry the randao mix forward and rotate the
/// pending attestations.
pub fn process_final_updates<T: EthSpec>(
    state: &mut BeaconState<T>,
    spec: &ChainSpec,
) -> Result<(), EpochProcessingError> {
    process_active_index_root_update(state, spec)?;
    process_randao_mixes_reset(state)?;
    process_pending_attestations_rotation(state);
    Ok(())
}

/// Set the active index root for the epoch whose seed will be derived from it.
pub fn process_active_index_root_update<T: EthSpec>(
    state: &mut BeaconState<T>,
    spec: &ChainSpec,
) -> Result<(), EpochProcessingError> {
    let index_epoch = state.next_epoch()?.safe_add(spec.activation_exit_delay)?;
    let index_root = state.compute_active_index_root(index_epoch)?;
    state.set_active_index_root(index_epoch, index_root)?;
    Ok(())
}

pub fn process_randao_mixes_reset<T: EthSpec>(
    state: &mut BeaconState<T>,
) -> Result<(), EpochProcessingError> {
    let current_epoch = state.current_epoch();
    let next_epoch = state.next_epoch()?;
    state.set_randao_mix(next_epoch, *state.get_randao_mix(current_epoch)?)?;
    Ok(())
}

/// The current epoch's attestations become the previous epoch's, and a new empty list is started.
pub fn process_pending_attestations_rotation<T: EthSpec>(state: &mut BeaconState<T>) {
    state.previous_epoch_attestations =
        std::mem::replace(&mut state.current_epoch_attestations, VariableList::empty());
}
