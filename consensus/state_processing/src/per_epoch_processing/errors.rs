use types::BeaconStateError;

#[derive(Debug, PartialEq, Clone)]
pub enum EpochProcessingError {
    /// The per-validator statuses do not line up with the validator registry.
    ValidatorStatusesInconsistent,
    /// The reward and penalty ledgers do not line up with each other or with the balances.
    DeltasInconsistent,
    DeltaOutOfBounds(usize),
    /// Unable to get the inclusion distance for a validator that should have an inclusion
    /// distance. This indicates an internal inconsistency.
    ///
    /// (validator_index)
    InclusionSlotsInconsistent(usize),
    /// The cancellation signal was raised before epoch processing completed.
    Cancelled,
    BeaconStateError(BeaconStateError),
    SszTypesError(ssz_types::Error),
    ArithError(safe_arith::ArithError),
    InvalidJustificationBit(ssz_types::Error),
}

impl EpochProcessingError {
    /// Returns `true` if processing stopped because it was cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self == EpochProcessingError::Cancelled
    }
}

impl From<BeaconStateError> for EpochProcessingError {
    fn from(e: BeaconStateError) -> EpochProcessingError {
        EpochProcessingError::BeaconStateError(e)
    }
}

impl From<ssz_types::Error> for EpochProcessingError {
    fn from(e: ssz_types::Error) -> EpochProcessingError {
        EpochProcessingError::SszTypesError(e)
    }
}

impl From<safe_arith::ArithError> for EpochProcessingError {
    fn from(e: safe_arith::ArithError) -> EpochProcessingError {
        EpochProcessingError::ArithError(e)
    }
}
