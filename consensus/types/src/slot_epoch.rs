//! The `Slot` and `Epoch` types are defined as new types over u64 to enforce type-safety between
//! the two types.
//!
//! `Slot` and `Epoch` have implementations which permit conversion, comparison and math operations
//! between each and `u64`, however specifically not between each other.
//!
//! The `std::ops` implementations are saturating. Use the `SafeArith` implementations where an
//! overflow must be reported rather than clamped.

use crate::slot_epoch_macros::int_to_fixed_bytes32;
use safe_arith::{ArithError, SafeArith};
use serde::{Deserialize, Serialize};
use std::cmp::{Ord, Ordering};
use std::fmt;
use std::iter::Iterator;
use std::ops::{Add, AddAssign, Rem, Sub, SubAssign};

#[derive(Eq, Clone, Copy, Default, Serialize, Deserialize, Hash, Ord)]
#[serde(transparent)]
pub struct Slot(u64);

#[derive(Eq, Clone, Copy, Default, Serialize, Deserialize, Hash, Ord)]
#[serde(transparent)]
pub struct Epoch(u64);

impl_common!(Slot);
impl_common!(Epoch);

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Slot({})", self.0)
    }
}

impl fmt::Debug for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Epoch({})", self.0)
    }
}

impl Slot {
    pub const fn new(slot: u64) -> Slot {
        Slot(slot)
    }

    pub fn epoch(self, slots_per_epoch: u64) -> Epoch {
        Epoch::new(self.0.checked_div(slots_per_epoch).unwrap_or(0))
    }

    pub fn max_value() -> Slot {
        Slot(u64::MAX)
    }
}

impl Epoch {
    pub const fn new(epoch: u64) -> Epoch {
        Epoch(epoch)
    }

    pub fn max_value() -> Epoch {
        Epoch(u64::MAX)
    }

    /// The first slot in the epoch.
    pub fn start_slot(self, slots_per_epoch: u64) -> Slot {
        Slot::from(self.0.saturating_mul(slots_per_epoch))
    }

    /// The last slot in the epoch.
    pub fn end_slot(self, slots_per_epoch: u64) -> Slot {
        Slot::from(
            self.0
                .saturating_mul(slots_per_epoch)
                .saturating_add(slots_per_epoch.saturating_sub(1)),
        )
    }

    /// Position of some slot inside an epoch, if any.
    ///
    /// E.g., the first `slot` in `epoch` is at position `0`.
    pub fn position(self, slot: Slot, slots_per_epoch: u64) -> Option<usize> {
        let start = self.start_slot(slots_per_epoch);
        let end = self.end_slot(slots_per_epoch);

        if slot >= start && slot <= end {
            slot.as_usize().checked_sub(start.as_usize())
        } else {
            None
        }
    }

    pub fn slot_iter(&self, slots_per_epoch: u64) -> SlotIter {
        SlotIter {
            current_iteration: 0,
            epoch: self,
            slots_per_epoch,
        }
    }
}

pub struct SlotIter<'a> {
    current_iteration: u64,
    epoch: &'a Epoch,
    slots_per_epoch: u64,
}

impl<'a> Iterator for SlotIter<'a> {
    type Item = Slot;

    fn next(&mut self) -> Option<Slot> {
        if self.current_iteration >= self.slots_per_epoch {
            None
        } else {
            let start_slot = self.epoch.start_slot(self.slots_per_epoch);
            let previous = self.current_iteration;
            self.current_iteration = self.current_iteration.checked_add(1)?;
            start_slot.safe_add(previous).ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssz::{Decode, Encode};
    use tree_hash::TreeHash;

    #[test]
    fn slot_to_epoch() {
        assert_eq!(Slot::new(0).epoch(8), Epoch::new(0));
        assert_eq!(Slot::new(7).epoch(8), Epoch::new(0));
        assert_eq!(Slot::new(8).epoch(8), Epoch::new(1));
        assert_eq!(Slot::new(17).epoch(8), Epoch::new(2));
    }

    #[test]
    fn epoch_start_and_end_slots() {
        let epoch = Epoch::new(3);
        assert_eq!(epoch.start_slot(32), Slot::new(96));
        assert_eq!(epoch.end_slot(32), Slot::new(127));
        assert_eq!(Epoch::max_value().end_slot(32), Slot::max_value());
    }

    #[test]
    fn position() {
        let epoch = Epoch::new(1);
        assert_eq!(epoch.position(Slot::new(7), 8), None);
        assert_eq!(epoch.position(Slot::new(8), 8), Some(0));
        assert_eq!(epoch.position(Slot::new(15), 8), Some(7));
        assert_eq!(epoch.position(Slot::new(16), 8), None);
    }

    #[test]
    fn slot_iter() {
        let slots: Vec<Slot> = Epoch::new(2).slot_iter(4).collect();
        assert_eq!(
            slots,
            vec![Slot::new(8), Slot::new(9), Slot::new(10), Slot::new(11)]
        );
    }

    #[test]
    fn saturating_ops() {
        assert_eq!(Epoch::new(0) - 1, Epoch::new(0));
        assert_eq!(Slot::max_value() + 1, Slot::max_value());
        assert_eq!(Slot::new(10) % 4, Slot::new(2));
        assert_eq!(Slot::new(u64::MAX - 2).saturating_add(8_u64), Slot::max_value());
        assert_eq!(Epoch::new(3).saturating_add(Epoch::new(4)), Epoch::new(7));
    }

    #[test]
    fn safe_arith() {
        assert_eq!(Epoch::new(0).safe_sub(1), Err(ArithError::Overflow));
        assert_eq!(Epoch::new(2).safe_add(Epoch::new(3)), Ok(Epoch::new(5)));
        assert_eq!(Slot::new(9).safe_div(0), Err(ArithError::DivisionByZero));
        assert_eq!(Slot::new(9).safe_rem(4), Ok(Slot::new(1)));
    }

    #[test]
    fn ssz_and_tree_hash_match_u64() {
        let slot = Slot::new(0x0102_0304);
        assert_eq!(slot.as_ssz_bytes(), 0x0102_0304_u64.as_ssz_bytes());
        assert_eq!(slot.tree_hash_root(), 0x0102_0304_u64.tree_hash_root());
        assert_eq!(Slot::from_ssz_bytes(&slot.as_ssz_bytes()), Ok(slot));
    }

    #[test]
    fn serde_is_transparent() {
        let yaml = serde_yaml::to_string(&Epoch::new(42)).unwrap();
        assert_eq!(yaml.trim(), "42");
    }
}
