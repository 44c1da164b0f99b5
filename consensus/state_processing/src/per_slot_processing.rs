use crate::cancellation::CancellationSignal;
use crate::per_epoch_processing::{per_epoch_processing, EpochProcessingSummary};
use crate::EpochProcessingError;
use safe_arith::{ArithError, SafeArith};
use slog::{trace, Logger};
use types::*;

#[derive(Debug, PartialEq)]
pub enum Error {
    BeaconStateError(BeaconStateError),
    EpochProcessingError(EpochProcessingError),
    ArithError(ArithError),
    /// The cancellation signal was raised before the slot was processed.
    Cancelled,
}

impl Error {
    /// Returns `true` if processing stopped because it was cancelled, either here or during epoch
    /// processing.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Error::Cancelled => true,
            Error::EpochProcessingError(e) => e.is_cancelled(),
            _ => false,
        }
    }
}

impl From<ArithError> for Error {
    fn from(e: ArithError) -> Self {
        Self::ArithError(e)
    }
}

/// Advances a state forward by one slot, performing per-epoch processing if required.
///
/// `previous_block_root` is the root of the latest block, which is recorded against the current
/// slot before the slot is incremented.
///
/// Returns a summary when the slot closed an epoch.
pub fn per_slot_processing<T: EthSpec, C: CancellationSignal>(
    state: &mut BeaconState<T>,
    previous_block_root: Hash256,
    cancel: &C,
    log: &Logger,
    spec: &ChainSpec,
) -> Result<Option<EpochProcessingSummary>, Error> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }

    state.set_block_root(state.slot, previous_block_root)?;

    let summary = if state.slot > spec.genesis_slot
        && state.slot.safe_add(1)?.safe_rem(T::slots_per_epoch())? == 0
    {
        Some(per_epoch_processing(state, cancel, log, spec)?)
    } else {
        None
    };

    state.slot.safe_add_assign(1)?;

    // Rotate the committee caches as the state enters a new epoch.
    if state.slot.safe_rem(T::slots_per_epoch())? == 0 {
        state.advance_caches()?;
        trace!(
            log,
            "Advanced committee caches";
            "epoch" => %state.current_epoch(),
        );
    }

    Ok(summary)
}

impl From<BeaconStateError> for Error {
    fn from(e: BeaconStateError) -> Error {
        Error::BeaconStateError(e)
    }
}

impl From<EpochProcessingError> for Error {
    fn from(e: EpochProcessingError) -> Error {
        Error::EpochProcessingError(e)
    }
}
