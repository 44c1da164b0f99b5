#![deny(clippy::wildcard_imports)]

use crate::cancellation::CancellationSignal;
pub use deltas::{apply_deltas, AttestationDeltas, Delta, Deltas};
pub use epoch_processing_summary::EpochProcessingSummary;
use errors::EpochProcessingError as Error;
pub use final_updates::process_final_updates;
pub use justification_and_finalization::{
    process_justification_and_finalization, weigh_justification_and_finalization,
    JustificationAndFinalizationState,
};
pub use rewards_and_penalties::{
    compute_deltas, finality_delay, is_in_inactivity_leak, process_rewards_and_penalties,
};
use slog::{debug, Logger};
use types::{BeaconState, ChainSpec, EthSpec, RelativeEpoch};
pub use validator_statuses::{InclusionInfo, TotalBalances, ValidatorStatus, ValidatorStatuses};

pub mod deltas;
pub mod epoch_processing_summary;
pub mod errors;
pub mod final_updates;
pub mod justification_and_finalization;
pub mod rewards_and_penalties;
pub mod validator_statuses;

/// The number of validators handled by each parallel task. Cancellation is polled once per chunk.
pub const VALIDATOR_CHUNK_SIZE: usize = 1024;

/// Performs per-epoch processing on some BeaconState.
///
/// Mutates the given `BeaconState`, returning early if an error is encountered. If an error is
/// returned, a state might be "half-processed" and therefore in an invalid state.
pub fn per_epoch_processing<T: EthSpec, C: CancellationSignal>(
    state: &mut BeaconState<T>,
    cancel: &C,
    log: &Logger,
    spec: &ChainSpec,
) -> Result<EpochProcessingSummary, Error> {
    // Ensure the committee caches are built.
    state.build_committee_cache(RelativeEpoch::Previous, spec)?;
    state.build_committee_cache(RelativeEpoch::Current, spec)?;

    // Load the struct we use to assign validators into sets based on their participation.
    //
    // E.g., attestation in the previous epoch, attested to chain head, etc.
    let mut validator_statuses = ValidatorStatuses::new(state, spec)?;
    validator_statuses.process_attestations(state, cancel)?;

    let totals = &validator_statuses.total_balances;
    debug!(
        log,
        "Epoch participation";
        "epoch" => %state.current_epoch(),
        "total_active" => totals.current_epoch(),
        "previous_target" => totals.previous_epoch_target_attesters(),
        "current_target" => totals.current_epoch_target_attesters(),
    );

    // Justification and finalization.
    let old_justified = state.current_justified_checkpoint;
    let old_finalized = state.finalized_checkpoint;
    let justification_and_finalization_state =
        process_justification_and_finalization(state, &validator_statuses.total_balances)?;
    justification_and_finalization_state.apply_changes_to_state(state);

    if state.current_justified_checkpoint != old_justified {
        debug!(
            log,
            "Justified checkpoint changed";
            "epoch" => %state.current_justified_checkpoint.epoch,
            "root" => ?state.current_justified_checkpoint.root,
        );
    }
    if state.finalized_checkpoint != old_finalized {
        debug!(
            log,
            "Finalized checkpoint changed";
            "epoch" => %state.finalized_checkpoint.epoch,
            "root" => ?state.finalized_checkpoint.root,
        );
    }

    // Rewards and Penalties.
    let finality_delay = finality_delay(state)?;
    if state.current_epoch() > T::genesis_epoch() && is_in_inactivity_leak(finality_delay, spec) {
        debug!(
            log,
            "Inactivity leak active";
            "finality_delay" => finality_delay,
        );
    }
    process_rewards_and_penalties(state, &validator_statuses, cancel, spec)?;

    // Final updates.
    process_final_updates(state, spec)?;

    Ok(EpochProcessingSummary {
        total_balances: validator_statuses.total_balances,
        statuses: validator_statuses.statuses,
    })
}
