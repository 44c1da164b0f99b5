// Clippy lint set-up (disabled in tests)
#![cfg_attr(
    not(test),
    deny(
        clippy::arithmetic_side_effects,
        clippy::disallowed_methods,
        clippy::indexing_slicing,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::let_underscore_must_use
    )
)]

#[macro_use]
mod macros;

pub mod cancellation;
pub mod common;
pub mod per_block_processing;
pub mod per_epoch_processing;
pub mod per_slot_processing;

pub use cancellation::{CancellationSignal, NeverCancel};
pub use per_block_processing::{
    errors::{
        AttestationInvalid, BlockOperationError, BlockProcessingError, IndexedAttestationInvalid,
    },
    process_attestation, process_attestations,
};
pub use per_epoch_processing::{
    errors::EpochProcessingError, per_epoch_processing, EpochProcessingSummary,
};
pub use per_slot_processing::{per_slot_processing, Error as SlotProcessingError};
