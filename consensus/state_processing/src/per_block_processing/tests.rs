#![cfg(test)]
use crate::per_block_processing::errors::{
    AttestationInvalid, BlockProcessingError, IndexedAttestationInvalid,
};
use crate::{process_attestation, process_attestations, NeverCancel};
use bls::{BlstVerifier, FakeVerifier, SignatureVerifier};
use logging::test_logger;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use types::test_utils::{
    AttestationTestTask, Keypair, TestingAttestationBuilder, TestingBeaconStateBuilder,
};
use types::*;

type E = MinimalEthSpec;

const VALIDATOR_COUNT: usize = 64;

/// Counts signature checks, accepting every signature.
#[derive(Default)]
struct CountingVerifier(AtomicUsize);

impl CountingVerifier {
    fn count(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

impl SignatureVerifier for CountingVerifier {
    fn fast_aggregate_verify(
        &self,
        _pubkeys: &[PublicKeyBytes],
        _message: Hash256,
        _signature: &SignatureBytes,
    ) -> bool {
        self.0.fetch_add(1, Ordering::Relaxed);
        true
    }
}

/// A state in the middle of epoch 3, with distinct block roots and built committee caches.
fn get_state(validator_count: usize) -> (BeaconState<E>, Vec<Keypair>, ChainSpec) {
    let spec = E::default_spec();
    let mut builder =
        TestingBeaconStateBuilder::<E>::from_deterministic_keypairs(validator_count, &spec);
    builder
        .fill_block_roots()
        .teleport_to_slot(Epoch::new(3).start_slot(E::slots_per_epoch()) + 4);
    builder.build_caches(&spec).unwrap();
    let (state, keypairs) = builder.build();
    (state, keypairs, spec)
}

/// A signed attestation from the whole first committee at `slot`, invalidated by `test_task`.
fn get_attestation(
    state: &BeaconState<E>,
    keypairs: &[Keypair],
    slot: Slot,
    test_task: AttestationTestTask,
    spec: &ChainSpec,
) -> Attestation<E> {
    let committee = state.get_beacon_committee(slot, 0).unwrap();
    let mut builder = TestingAttestationBuilder::new(state, committee.committee, slot, 0);
    builder
        .sign_all(keypairs, state, spec)
        .apply_test_task(test_task, state);
    builder.build()
}

/// Process a single attestation from the previous slot, invalidated by `test_task`, skipping
/// signature verification.
fn test_task(test_task: AttestationTestTask) -> Result<(), BlockProcessingError> {
    let (mut state, keypairs, spec) = get_state(VALIDATOR_COUNT);
    let slot = state.slot - 1;
    let attestation = get_attestation(&state, &keypairs, slot, test_task, &spec);
    process_attestation(&mut state, &attestation, &FakeVerifier, &spec)
}

fn invalid(reason: AttestationInvalid) -> Result<(), BlockProcessingError> {
    Err(BlockProcessingError::AttestationInvalid { index: 0, reason })
}

#[test]
fn valid_attestation() {
    assert_eq!(test_task(AttestationTestTask::Valid), Ok(()));
}

#[test]
fn included_too_early() {
    let state_slot = Epoch::new(3).start_slot(E::slots_per_epoch()) + 4;
    assert_eq!(
        test_task(AttestationTestTask::IncludedTooEarly),
        invalid(AttestationInvalid::IncludedTooEarly {
            state: state_slot,
            delay: 1,
            attestation: state_slot,
        })
    );
}

#[test]
fn included_too_late() {
    let state_slot = Epoch::new(3).start_slot(E::slots_per_epoch()) + 4;
    assert_eq!(
        test_task(AttestationTestTask::IncludedTooLate),
        invalid(AttestationInvalid::IncludedTooLate {
            state: state_slot,
            attestation: state_slot - E::slots_per_epoch() - 1,
        })
    );
}

#[test]
fn slot_near_u64_max_rejected_as_too_early() {
    let (mut state, keypairs, spec) = get_state(VALIDATOR_COUNT);
    let slot = state.slot - 1;
    let mut attestation =
        get_attestation(&state, &keypairs, slot, AttestationTestTask::Valid, &spec);
    attestation.data.slot = Slot::new(u64::MAX - 2);

    assert_eq!(
        process_attestation(&mut state, &attestation, &FakeVerifier, &spec),
        invalid(AttestationInvalid::IncludedTooEarly {
            state: state.slot,
            delay: spec.min_attestation_inclusion_delay,
            attestation: Slot::new(u64::MAX - 2),
        })
    );
}

#[test]
fn target_epoch_too_old() {
    assert_eq!(
        test_task(AttestationTestTask::TargetEpochTooOld),
        invalid(AttestationInvalid::TargetEpochTooOld {
            previous: Epoch::new(2),
            attestation: Epoch::new(1),
        })
    );
}

#[test]
fn target_epoch_from_future() {
    assert_eq!(
        test_task(AttestationTestTask::TargetEpochFromFuture),
        invalid(AttestationInvalid::TargetEpochFromFuture {
            current: Epoch::new(3),
            attestation: Epoch::new(4),
        })
    );
}

#[test]
fn target_epoch_slot_mismatch() {
    assert_eq!(
        test_task(AttestationTestTask::TargetEpochSlotMismatch),
        invalid(AttestationInvalid::TargetEpochSlotMismatch {
            target_epoch: Epoch::new(2),
            slot_epoch: Epoch::new(3),
        })
    );
}

#[test]
fn bad_committee_index() {
    assert_eq!(
        test_task(AttestationTestTask::BadCommitteeIndex),
        invalid(AttestationInvalid::BadCommitteeIndex {
            index: 1,
            committees_per_slot: 1,
        })
    );
}

#[test]
fn wrong_justified_checkpoint() {
    let (state, _, _) = get_state(VALIDATOR_COUNT);
    assert_eq!(
        test_task(AttestationTestTask::WrongJustifiedCheckpoint),
        invalid(AttestationInvalid::WrongJustifiedCheckpoint {
            state: state.current_justified_checkpoint,
            attestation: Checkpoint {
                epoch: state.current_justified_checkpoint.epoch,
                root: Hash256::repeat_byte(0xff),
            },
            is_current: true,
        })
    );
}

#[test]
fn bad_aggregation_bitfield_len() {
    assert_eq!(
        test_task(AttestationTestTask::BadAggregationBitfieldLen),
        invalid(AttestationInvalid::BadAggregationBitfieldLength {
            committee_len: 8,
            bitfield_len: 7,
        })
    );
}

#[test]
fn no_attesters() {
    assert_eq!(
        test_task(AttestationTestTask::NoAttesters),
        invalid(AttestationInvalid::BadIndexedAttestation(
            IndexedAttestationInvalid::IndicesEmpty
        ))
    );
}

#[test]
fn real_signatures() {
    let (mut state, keypairs, spec) = get_state(VALIDATOR_COUNT);
    let slot = state.slot - 1;

    let valid = get_attestation(&state, &keypairs, slot, AttestationTestTask::Valid, &spec);
    assert_eq!(
        process_attestation(&mut state, &valid, &BlstVerifier, &spec),
        Ok(())
    );

    let bad = get_attestation(
        &state,
        &keypairs,
        slot,
        AttestationTestTask::BadSignature,
        &spec,
    );
    assert_eq!(
        process_attestation(&mut state, &bad, &BlstVerifier, &spec),
        invalid(AttestationInvalid::BadIndexedAttestation(
            IndexedAttestationInvalid::BadSignature
        ))
    );
}

#[test]
fn stale_attestations_leave_state_untouched() {
    for task in [
        AttestationTestTask::IncludedTooLate,
        AttestationTestTask::TargetEpochTooOld,
    ] {
        let (mut state, keypairs, spec) = get_state(VALIDATOR_COUNT);
        let slot = state.slot - 1;
        let attestation = get_attestation(&state, &keypairs, slot, task, &spec);
        let before = state.clone();

        assert!(process_attestation(&mut state, &attestation, &FakeVerifier, &spec).is_err());
        assert_eq!(state, before);
    }
}

#[test]
fn short_bitfield_rejected_before_signature_check() {
    // 40 validators give a single committee of 5 per slot.
    let (mut state, keypairs, spec) = get_state(40);
    let slot = state.slot - 1;
    assert_eq!(state.get_beacon_committee(slot, 0).unwrap().committee.len(), 5);

    let attestation = get_attestation(
        &state,
        &keypairs,
        slot,
        AttestationTestTask::BadAggregationBitfieldLen,
        &spec,
    );
    let verifier = CountingVerifier::default();

    assert_eq!(
        process_attestation(&mut state, &attestation, &verifier, &spec),
        invalid(AttestationInvalid::BadAggregationBitfieldLength {
            committee_len: 5,
            bitfield_len: 4,
        })
    );
    assert_eq!(verifier.count(), 0);

    // The same committee with a full-length bitfield is checked exactly once.
    let attestation = get_attestation(&state, &keypairs, slot, AttestationTestTask::Valid, &spec);
    assert_eq!(
        process_attestation(&mut state, &attestation, &verifier, &spec),
        Ok(())
    );
    assert_eq!(verifier.count(), 1);
}

#[test]
fn attestations_are_routed_by_target_epoch() {
    let (mut state, keypairs, spec) = get_state(VALIDATOR_COUNT);
    let current_slot = state.slot - 1;
    let previous_slot = state.slot - 6;
    assert_eq!(
        previous_slot.epoch(E::slots_per_epoch()),
        state.previous_epoch()
    );

    let attestations = vec![
        get_attestation(
            &state,
            &keypairs,
            current_slot,
            AttestationTestTask::Valid,
            &spec,
        ),
        get_attestation(
            &state,
            &keypairs,
            previous_slot,
            AttestationTestTask::Valid,
            &spec,
        ),
    ];
    let proposer_index = state.get_beacon_proposer_index(state.slot, &spec).unwrap() as u64;

    process_attestations(
        &mut state,
        &attestations,
        &FakeVerifier,
        &NeverCancel,
        &test_logger(),
        &spec,
    )
    .unwrap();

    assert_eq!(state.current_epoch_attestations.len(), 1);
    assert_eq!(state.previous_epoch_attestations.len(), 1);

    let current = &state.current_epoch_attestations[0];
    assert_eq!(current.data, attestations[0].data);
    assert_eq!(current.aggregation_bits, attestations[0].aggregation_bits);
    assert_eq!(current.inclusion_delay, 1);

    let previous = &state.previous_epoch_attestations[0];
    assert_eq!(previous.data, attestations[1].data);
    assert_eq!(previous.inclusion_delay, 6);

    // Every pending attestation records the proposer of the including block.
    assert_eq!(current.proposer_index, proposer_index);
    assert_eq!(previous.proposer_index, proposer_index);
}

#[test]
fn batch_stops_at_first_rejection() {
    let (mut state, keypairs, spec) = get_state(VALIDATOR_COUNT);
    let slot = state.slot - 1;
    let attestations = vec![
        get_attestation(&state, &keypairs, slot, AttestationTestTask::Valid, &spec),
        get_attestation(
            &state,
            &keypairs,
            slot,
            AttestationTestTask::BadCommitteeIndex,
            &spec,
        ),
        get_attestation(&state, &keypairs, slot, AttestationTestTask::Valid, &spec),
    ];

    let result = process_attestations(
        &mut state,
        &attestations,
        &FakeVerifier,
        &NeverCancel,
        &test_logger(),
        &spec,
    );

    assert_eq!(
        result,
        Err(BlockProcessingError::AttestationInvalid {
            index: 1,
            reason: AttestationInvalid::BadCommitteeIndex {
                index: 1,
                committees_per_slot: 1,
            },
        })
    );
    // The attestation before the rejection is kept.
    assert_eq!(state.current_epoch_attestations.len(), 1);
}

#[test]
fn cancelled_batch() {
    let (mut state, keypairs, spec) = get_state(VALIDATOR_COUNT);
    let slot = state.slot - 1;
    let attestations = vec![get_attestation(
        &state,
        &keypairs,
        slot,
        AttestationTestTask::Valid,
        &spec,
    )];

    let result = process_attestations(
        &mut state,
        &attestations,
        &FakeVerifier,
        &AtomicBool::new(true),
        &test_logger(),
        &spec,
    );

    assert_eq!(result, Err(BlockProcessingError::Cancelled));
    assert!(result.unwrap_err().is_cancelled());
    assert!(state.current_epoch_attestations.is_empty());
}
