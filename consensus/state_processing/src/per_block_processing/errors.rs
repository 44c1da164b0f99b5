use safe_arith::ArithError;
use types::*;

/// The error returned from the `process_attestations` function. Indicates that a batch of
/// attestations is either invalid, or we were unable to determine its validity (we encountered an
/// unexpected error).
///
/// Any of the `...Error` variants indicate that at some point during block (and attestation)
/// verification there was an error. There is no indication as to _where_ that error happened
/// (e.g., when processing attestations instead of when processing the validator registry).
#[derive(Debug, PartialEq, Clone)]
pub enum BlockProcessingError {
    /// The attestation at position `index` in the batch was rejected.
    AttestationInvalid {
        index: usize,
        reason: AttestationInvalid,
    },
    /// There is no room left in the pending attestation list for `target_epoch`.
    PendingAttestationsFull {
        target_epoch: Epoch,
    },
    /// The cancellation signal was raised before the batch completed.
    Cancelled,
    BeaconStateError(BeaconStateError),
    SszTypesError(ssz_types::Error),
    ArithError(ArithError),
}

impl BlockProcessingError {
    /// Returns `true` if processing stopped because it was cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self == BlockProcessingError::Cancelled
    }
}

impl From<BeaconStateError> for BlockProcessingError {
    fn from(e: BeaconStateError) -> Self {
        BlockProcessingError::BeaconStateError(e)
    }
}

impl From<ssz_types::Error> for BlockProcessingError {
    fn from(error: ssz_types::Error) -> Self {
        BlockProcessingError::SszTypesError(error)
    }
}

impl From<ArithError> for BlockProcessingError {
    fn from(e: ArithError) -> Self {
        BlockProcessingError::ArithError(e)
    }
}

/// A conversion that consumes `self` and adds an `index` variable to resulting struct.
///
/// Used here to allow converting an error into an upstream error that points to the object that
/// caused the error. For example, pointing to the index of an attestation that caused the
/// `AttestationInvalid` error.
pub trait IntoWithIndex<T>: Sized {
    fn into_with_index(self, index: usize) -> T;
}

impl IntoWithIndex<BlockProcessingError> for BlockOperationError<AttestationInvalid> {
    fn into_with_index(self, index: usize) -> BlockProcessingError {
        match self {
            BlockOperationError::Invalid(reason) => {
                BlockProcessingError::AttestationInvalid { index, reason }
            }
            BlockOperationError::BeaconStateError(e) => BlockProcessingError::BeaconStateError(e),
            BlockOperationError::SszTypesError(e) => BlockProcessingError::SszTypesError(e),
            BlockOperationError::ArithError(e) => BlockProcessingError::ArithError(e),
        }
    }
}

/*
 * Per-operation errors
 */

/// Either a reason why an operation is invalid, or an unexpected error which prevented its
/// validity from being determined.
#[derive(Debug, PartialEq, Clone)]
pub enum BlockOperationError<T> {
    Invalid(T),
    BeaconStateError(BeaconStateError),
    SszTypesError(ssz_types::Error),
    ArithError(ArithError),
}

impl<T> BlockOperationError<T> {
    pub fn invalid(reason: T) -> BlockOperationError<T> {
        BlockOperationError::Invalid(reason)
    }
}

impl<T> From<BeaconStateError> for BlockOperationError<T> {
    fn from(e: BeaconStateError) -> Self {
        BlockOperationError::BeaconStateError(e)
    }
}

impl<T> From<ssz_types::Error> for BlockOperationError<T> {
    fn from(error: ssz_types::Error) -> Self {
        BlockOperationError::SszTypesError(error)
    }
}

impl<T> From<ArithError> for BlockOperationError<T> {
    fn from(e: ArithError) -> Self {
        BlockOperationError::ArithError(e)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum AttestationInvalid {
    /// More than `SLOTS_PER_EPOCH` slots have passed since the attestation's slot.
    IncludedTooLate { state: Slot, attestation: Slot },
    /// Fewer than `MIN_ATTESTATION_INCLUSION_DELAY` slots have passed since the attestation's
    /// slot.
    IncludedTooEarly {
        state: Slot,
        delay: u64,
        attestation: Slot,
    },
    /// The target epoch is before the state's previous epoch.
    TargetEpochTooOld { previous: Epoch, attestation: Epoch },
    /// The target epoch is after the state's current epoch.
    TargetEpochFromFuture { current: Epoch, attestation: Epoch },
    /// The target epoch is not the epoch of the attestation's slot.
    TargetEpochSlotMismatch {
        target_epoch: Epoch,
        slot_epoch: Epoch,
    },
    /// The committee index is not below the number of committees per slot.
    BadCommitteeIndex {
        index: CommitteeIndex,
        committees_per_slot: u64,
    },
    /// Attestation source does not equal the justified checkpoint for its target epoch.
    WrongJustifiedCheckpoint {
        state: Checkpoint,
        attestation: Checkpoint,
        is_current: bool,
    },
    /// The aggregation bitfield length is not the length of the committee.
    BadAggregationBitfieldLength {
        committee_len: usize,
        bitfield_len: usize,
    },
    /// The indexed form of the attestation is invalid.
    BadIndexedAttestation(IndexedAttestationInvalid),
}

impl From<BlockOperationError<IndexedAttestationInvalid>>
    for BlockOperationError<AttestationInvalid>
{
    fn from(e: BlockOperationError<IndexedAttestationInvalid>) -> Self {
        match e {
            BlockOperationError::Invalid(e) => {
                BlockOperationError::invalid(AttestationInvalid::BadIndexedAttestation(e))
            }
            BlockOperationError::BeaconStateError(e) => BlockOperationError::BeaconStateError(e),
            BlockOperationError::SszTypesError(e) => BlockOperationError::SszTypesError(e),
            BlockOperationError::ArithError(e) => BlockOperationError::ArithError(e),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum IndexedAttestationInvalid {
    /// The number of indices is 0.
    IndicesEmpty,
    /// The number of indices exceeds the global maximum.
    ///
    /// (max_indices, indices_given)
    MaxIndicesExceed(usize, usize),
    /// The validator indices were not in increasing order.
    ///
    /// The error occurred between the given `index` and `index + 1`
    BadValidatorIndicesOrdering(usize),
    /// The validator index is not in the registry.
    UnknownValidator(u64),
    /// The indexed attestation aggregate signature was not valid.
    BadSignature,
}
