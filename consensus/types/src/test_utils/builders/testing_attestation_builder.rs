use crate::test_utils::{Keypair, TestingAttestationDataBuilder};
use crate::*;
use bls::aggregate_signatures;

/// Ways to invalidate an attestation, each triggering a distinct rejection.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum AttestationTestTask {
    Valid,
    /// `data.slot` is the inclusion slot.
    IncludedTooEarly,
    /// `data.slot` is more than an epoch before the inclusion slot.
    IncludedTooLate,
    /// Target epoch is before the previous epoch.
    TargetEpochTooOld,
    /// Target epoch is after the current epoch.
    TargetEpochFromFuture,
    /// Target epoch is valid, but not the epoch of `data.slot`.
    TargetEpochSlotMismatch,
    BadCommitteeIndex,
    WrongJustifiedCheckpoint,
    /// One bit fewer than the committee size.
    BadAggregationBitfieldLen,
    /// No bits set.
    NoAttesters,
    BadSignature,
}

/// Builds an attestation to be used for testing purposes.
///
/// This struct should **never be used for production purposes.**
pub struct TestingAttestationBuilder<T: EthSpec> {
    committee: Vec<usize>,
    attestation: Attestation<T>,
}

impl<T: EthSpec> TestingAttestationBuilder<T> {
    /// Create a new, unsigned attestation for the committee at `(slot, index)` with no bits set.
    pub fn new(state: &BeaconState<T>, committee: &[usize], slot: Slot, index: u64) -> Self {
        let data = TestingAttestationDataBuilder::new(state, index, slot).build();

        let aggregation_bits =
            BitList::with_capacity(committee.len()).expect("committee too large");

        let attestation = Attestation {
            aggregation_bits,
            data,
            signature: SignatureBytes::empty(),
        };

        Self {
            attestation,
            committee: committee.to_vec(),
        }
    }

    /// Signs the attestation with a subset (or all) committee members.
    ///
    /// `keypairs` is indexed by validator index, i.e. `keypairs[v]` belongs to validator `v`.
    pub fn sign(
        &mut self,
        signing_validators: &[usize],
        keypairs: &[Keypair],
        state: &BeaconState<T>,
        spec: &ChainSpec,
    ) -> &mut Self {
        let domain = state.get_domain(
            self.attestation.data.target.epoch,
            Domain::BeaconAttester,
            spec,
        );
        let message = self.attestation.data.signing_root(domain);

        let signatures = signing_validators
            .iter()
            .map(|validator_index| {
                let committee_index = self
                    .committee
                    .iter()
                    .position(|v| v == validator_index)
                    .expect("Signing validator not in attestation committee");

                self.attestation
                    .aggregation_bits
                    .set(committee_index, true)
                    .expect("committee index within bitfield");

                keypairs[*validator_index].sign(message)
            })
            .collect::<Vec<_>>();

        if !signatures.is_empty() {
            self.attestation.signature =
                aggregate_signatures(&signatures).expect("signatures should aggregate");
        }

        self
    }

    /// Signs the attestation with every member of the committee.
    pub fn sign_all(
        &mut self,
        keypairs: &[Keypair],
        state: &BeaconState<T>,
        spec: &ChainSpec,
    ) -> &mut Self {
        let committee = self.committee.clone();
        self.sign(&committee, keypairs, state, spec)
    }

    /// Sets every aggregation bit without producing a signature. Pair with a verifier that
    /// accepts all signatures.
    pub fn set_all_bits(&mut self) -> &mut Self {
        for i in 0..self.committee.len() {
            self.attestation
                .aggregation_bits
                .set(i, true)
                .expect("committee index within bitfield");
        }
        self
    }

    /// Invalidates the attestation according to `test_task`.
    ///
    /// Applied after signing, so only `BadSignature` is caught by signature verification.
    pub fn apply_test_task(
        &mut self,
        test_task: AttestationTestTask,
        state: &BeaconState<T>,
    ) -> &mut Self {
        let slots_per_epoch = T::slots_per_epoch();
        let data = &mut self.attestation.data;

        match test_task {
            AttestationTestTask::Valid => (),
            AttestationTestTask::IncludedTooEarly => data.slot = state.slot,
            AttestationTestTask::IncludedTooLate => {
                data.slot = state.slot - slots_per_epoch - 1;
            }
            AttestationTestTask::TargetEpochTooOld => {
                data.target.epoch = state.previous_epoch() - 1;
            }
            AttestationTestTask::TargetEpochFromFuture => {
                data.target.epoch = state.current_epoch() + 1;
            }
            AttestationTestTask::TargetEpochSlotMismatch => {
                data.target.epoch = if data.target.epoch == state.current_epoch() {
                    state.previous_epoch()
                } else {
                    state.current_epoch()
                };
            }
            AttestationTestTask::BadCommitteeIndex => {
                data.index = state
                    .get_committee_count_at_slot(data.slot)
                    .expect("committee cache should be built");
            }
            AttestationTestTask::WrongJustifiedCheckpoint => {
                data.source.root = Hash256::repeat_byte(0xff);
            }
            AttestationTestTask::BadAggregationBitfieldLen => {
                let len = self.committee.len().saturating_sub(1);
                self.attestation.aggregation_bits =
                    BitList::with_capacity(len).expect("committee too large");
            }
            AttestationTestTask::NoAttesters => {
                self.attestation.aggregation_bits =
                    BitList::with_capacity(self.committee.len()).expect("committee too large");
            }
            AttestationTestTask::BadSignature => {
                self.attestation.signature = SignatureBytes::empty();
            }
        }

        self
    }

    /// Consume the builder and return the attestation.
    pub fn build(self) -> Attestation<T> {
        self.attestation
    }
}
