use crate::cancellation::CancellationSignal;
use bls::SignatureVerifier;
use errors::{BlockProcessingError, IntoWithIndex};
use safe_arith::SafeArith;
use slog::{debug, Logger};
use types::*;

pub use is_valid_indexed_attestation::is_valid_indexed_attestation;
pub use verify_attestation::{
    verify_attestation_for_block_inclusion, verify_attestation_for_state,
};

pub mod errors;
mod is_valid_indexed_attestation;
pub mod tests;
mod verify_attestation;

/// Validates each `Attestation` and updates the state, short-circuiting on an invalid object.
///
/// Attestations are processed in order. The cancellation signal is polled before each one. When an
/// attestation is rejected, or processing is cancelled, the effects of the attestations before it
/// are kept.
///
/// Returns `Ok(())` if the validation and state updates completed successfully, otherwise returns
/// an `Err` describing the invalid object or cause of failure.
pub fn process_attestations<T, V, C>(
    state: &mut BeaconState<T>,
    attestations: &[Attestation<T>],
    verifier: &V,
    cancel: &C,
    log: &Logger,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError>
where
    T: EthSpec,
    V: SignatureVerifier,
    C: CancellationSignal,
{
    build_attestation_caches(state, spec)?;

    // The proposer is the same for every attestation in the batch. It is only computed once the
    // first attestation has been verified.
    let mut proposer_index = None;

    for (i, attestation) in attestations.iter().enumerate() {
        block_verify!(!cancel.is_cancelled(), BlockProcessingError::Cancelled);

        apply_attestation(state, attestation, i, &mut proposer_index, verifier, spec).map_err(
            |e| {
                if let BlockProcessingError::AttestationInvalid { index, reason } = &e {
                    debug!(
                        log,
                        "Rejected attestation";
                        "index" => index,
                        "reason" => ?reason,
                        "slot" => %attestation.data.slot,
                    );
                }
                e
            },
        )?;
    }

    Ok(())
}

/// Validates a single `Attestation` and records it as pending in `state`.
///
/// A rejection is reported as `AttestationInvalid` with `index` zero.
pub fn process_attestation<T: EthSpec, V: SignatureVerifier>(
    state: &mut BeaconState<T>,
    attestation: &Attestation<T>,
    verifier: &V,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    build_attestation_caches(state, spec)?;
    apply_attestation(state, attestation, 0, &mut None, verifier, spec)
}

/// Ensure the previous and current epoch caches exist.
fn build_attestation_caches<T: EthSpec>(
    state: &mut BeaconState<T>,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    state.build_committee_cache(RelativeEpoch::Previous, spec)?;
    state.build_committee_cache(RelativeEpoch::Current, spec)?;
    Ok(())
}

fn apply_attestation<T: EthSpec, V: SignatureVerifier>(
    state: &mut BeaconState<T>,
    attestation: &Attestation<T>,
    index: usize,
    proposer_index_cache: &mut Option<u64>,
    verifier: &V,
    spec: &ChainSpec,
) -> Result<(), BlockProcessingError> {
    verify_attestation_for_block_inclusion(state, attestation, verifier, spec)
        .map_err(|e| e.into_with_index(index))?;

    let proposer_index = if let Some(proposer_index) = *proposer_index_cache {
        proposer_index
    } else {
        let proposer_index = state.get_beacon_proposer_index(state.slot, spec)? as u64;
        *proposer_index_cache = Some(proposer_index);
        proposer_index
    };

    let target_epoch = attestation.data.target.epoch;
    let pending_attestation = PendingAttestation {
        aggregation_bits: attestation.aggregation_bits.clone(),
        data: attestation.data.clone(),
        inclusion_delay: state.slot.safe_sub(attestation.data.slot)?.as_u64(),
        proposer_index,
    };

    let pending_attestations = if target_epoch == state.current_epoch() {
        &mut state.current_epoch_attestations
    } else {
        &mut state.previous_epoch_attestations
    };

    pending_attestations
        .push(pending_attestation)
        .map_err(|_| BlockProcessingError::PendingAttestationsFull { target_epoch })
}
