//! Cooperative cancellation for long-running transitions.
//!
//! A transition polls its `CancellationSignal` once before each attestation and once per chunk of
//! validators. Once cancelled it returns a `Cancelled` error. Work completed before the poll is not
//! rolled back, so the state must be discarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub trait CancellationSignal: Sync {
    /// Returns `true` if the caller has asked for the transition to stop.
    fn is_cancelled(&self) -> bool;
}

/// A signal that is never raised.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancellationSignal for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl CancellationSignal for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<T: CancellationSignal + ?Sized> CancellationSignal for &T {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

impl<T: CancellationSignal + ?Sized + Send> CancellationSignal for Arc<T> {
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll<C: CancellationSignal>(cancel: C) -> bool {
        cancel.is_cancelled()
    }

    #[test]
    fn never_cancel() {
        assert!(!poll(NeverCancel));
    }

    #[test]
    fn atomic_bool_is_shared() {
        let flag = Arc::new(AtomicBool::new(false));
        assert!(!poll(flag.clone()));

        flag.store(true, Ordering::Relaxed);
        assert!(poll(flag.clone()));
        assert!(poll(&*flag));
    }
}
