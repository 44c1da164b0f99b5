use super::errors::{AttestationInvalid as Invalid, BlockOperationError};
use super::is_valid_indexed_attestation::is_valid_indexed_attestation;
use crate::common::get_indexed_attestation;
use bls::SignatureVerifier;
use types::*;

type Result<T> = std::result::Result<T, BlockOperationError<Invalid>>;

fn error(reason: Invalid) -> BlockOperationError<Invalid> {
    BlockOperationError::invalid(reason)
}

/// Returns `Ok(indexed_attestation)` if the given `attestation` is valid to be included in a block
/// that is applied to `state`. Otherwise, returns a descriptive `Err`.
///
/// The committee caches for the previous and current epochs must be built.
pub fn verify_attestation_for_block_inclusion<T: EthSpec, V: SignatureVerifier>(
    state: &BeaconState<T>,
    attestation: &Attestation<T>,
    verifier: &V,
    spec: &ChainSpec,
) -> Result<IndexedAttestation<T>> {
    let data = &attestation.data;

    // Saturating, so a slot near `u64::MAX` is rejected as too early rather than overflowing.
    verify!(
        state.slot <= data.slot.saturating_add(T::slots_per_epoch()),
        Invalid::IncludedTooLate {
            state: state.slot,
            attestation: data.slot,
        }
    );

    verify!(
        data.slot.saturating_add(spec.min_attestation_inclusion_delay) <= state.slot,
        Invalid::IncludedTooEarly {
            state: state.slot,
            delay: spec.min_attestation_inclusion_delay,
            attestation: data.slot,
        }
    );

    verify_attestation_for_state(state, attestation, verifier, spec)
}

/// Returns `Ok(indexed_attestation)` if `attestation` is a valid attestation for the chain that
/// precedes the given `state`.
///
/// Does not check the inclusion delay, see `verify_attestation_for_block_inclusion` for that.
pub fn verify_attestation_for_state<T: EthSpec, V: SignatureVerifier>(
    state: &BeaconState<T>,
    attestation: &Attestation<T>,
    verifier: &V,
    spec: &ChainSpec,
) -> Result<IndexedAttestation<T>> {
    let data = &attestation.data;

    verify!(
        data.target.epoch >= state.previous_epoch(),
        Invalid::TargetEpochTooOld {
            previous: state.previous_epoch(),
            attestation: data.target.epoch,
        }
    );
    verify!(
        data.target.epoch <= state.current_epoch(),
        Invalid::TargetEpochFromFuture {
            current: state.current_epoch(),
            attestation: data.target.epoch,
        }
    );

    let slot_epoch = data.slot.epoch(T::slots_per_epoch());
    verify!(
        data.target.epoch == slot_epoch,
        Invalid::TargetEpochSlotMismatch {
            target_epoch: data.target.epoch,
            slot_epoch,
        }
    );

    let committees_per_slot = state.get_committee_count_at_slot(data.slot)?;
    verify!(
        data.index < committees_per_slot,
        Invalid::BadCommitteeIndex {
            index: data.index,
            committees_per_slot,
        }
    );

    // Verify the Casper FFG vote.
    verify_casper_ffg_vote(attestation, state)?;

    let committee = state.get_beacon_committee(data.slot, data.index)?;
    verify!(
        attestation.aggregation_bits.len() == committee.committee.len(),
        Invalid::BadAggregationBitfieldLength {
            committee_len: committee.committee.len(),
            bitfield_len: attestation.aggregation_bits.len(),
        }
    );

    // Check signature and bitfields
    let indexed_attestation = get_indexed_attestation(committee.committee, attestation)?;
    is_valid_indexed_attestation(state, &indexed_attestation, verifier, spec)?;

    Ok(indexed_attestation)
}

/// Check target epoch and source checkpoint.
fn verify_casper_ffg_vote<T: EthSpec>(
    attestation: &Attestation<T>,
    state: &BeaconState<T>,
) -> Result<()> {
    let data = &attestation.data;
    if data.target.epoch == state.current_epoch() {
        verify!(
            data.source == state.current_justified_checkpoint,
            Invalid::WrongJustifiedCheckpoint {
                state: state.current_justified_checkpoint,
                attestation: data.source,
                is_current: true,
            }
        );
    } else {
        verify!(
            data.source == state.previous_justified_checkpoint,
            Invalid::WrongJustifiedCheckpoint {
                state: state.previous_justified_checkpoint,
                attestation: data.source,
                is_current: false,
            }
        );
    }
    Ok(())
}
