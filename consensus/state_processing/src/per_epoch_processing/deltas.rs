use super::errors::EpochProcessingError as Error;
use crate::common::{decrease_balance_directly, increase_balance_directly};
use safe_arith::SafeArith;

/// Used to track the changes to a validator's balance.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct Delta {
    pub rewards: u64,
    pub penalties: u64,
}

impl Delta {
    /// Reward the validator with the `reward`.
    pub fn reward(&mut self, reward: u64) -> Result<(), Error> {
        self.rewards = self.rewards.safe_add(reward)?;
        Ok(())
    }

    /// Penalize the validator with the `penalty`.
    pub fn penalize(&mut self, penalty: u64) -> Result<(), Error> {
        self.penalties = self.penalties.safe_add(penalty)?;
        Ok(())
    }

    /// Combine two deltas.
    pub fn combine(&mut self, other: Delta) -> Result<(), Error> {
        self.reward(other.rewards)?;
        self.penalize(other.penalties)
    }
}

/// A pair of parallel ledgers, one reward and one penalty per validator.
///
/// The two vectors always have the same length.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct Deltas {
    rewards: Vec<u64>,
    penalties: Vec<u64>,
}

impl Deltas {
    /// Zeroed ledgers for `len` validators.
    pub fn new(len: usize) -> Self {
        Self {
            rewards: vec![0; len],
            penalties: vec![0; len],
        }
    }

    /// An empty ledger with room for `capacity` validators.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rewards: Vec::with_capacity(capacity),
            penalties: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    pub fn rewards(&self) -> &[u64] {
        &self.rewards
    }

    pub fn penalties(&self) -> &[u64] {
        &self.penalties
    }

    /// Returns the combined delta for the validator at `index`.
    pub fn get(&self, index: usize) -> Option<Delta> {
        Some(Delta {
            rewards: *self.rewards.get(index)?,
            penalties: *self.penalties.get(index)?,
        })
    }

    /// Append the delta for the next validator.
    pub fn push(&mut self, delta: Delta) {
        self.rewards.push(delta.rewards);
        self.penalties.push(delta.penalties);
    }

    pub fn add_reward(&mut self, index: usize, reward: u64) -> Result<(), Error> {
        self.rewards
            .get_mut(index)
            .ok_or(Error::DeltaOutOfBounds(index))?
            .safe_add_assign(reward)?;
        Ok(())
    }

    pub fn add_penalty(&mut self, index: usize, penalty: u64) -> Result<(), Error> {
        self.penalties
            .get_mut(index)
            .ok_or(Error::DeltaOutOfBounds(index))?
            .safe_add_assign(penalty)?;
        Ok(())
    }

    /// Move the entries of `other` onto the end of `self`.
    pub fn append(&mut self, other: &mut Deltas) {
        self.rewards.append(&mut other.rewards);
        self.penalties.append(&mut other.penalties);
    }

    /// Add `other` to `self`, element-wise. Both must have the same length.
    pub fn combine(&mut self, other: &Deltas) -> Result<(), Error> {
        if self.len() != other.len() {
            return Err(Error::DeltasInconsistent);
        }

        for (mine, theirs) in self.rewards.iter_mut().zip(&other.rewards) {
            mine.safe_add_assign(*theirs)?;
        }
        for (mine, theirs) in self.penalties.iter_mut().zip(&other.penalties) {
            mine.safe_add_assign(*theirs)?;
        }
        Ok(())
    }
}

/// The deltas for each component of the attestation rewards.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct AttestationDeltas {
    pub source: Deltas,
    pub target: Deltas,
    pub head: Deltas,
    pub inclusion_delay: Deltas,
    pub inactivity: Deltas,
}

impl AttestationDeltas {
    pub fn new(len: usize) -> Self {
        Self {
            source: Deltas::new(len),
            target: Deltas::new(len),
            head: Deltas::new(len),
            inclusion_delay: Deltas::new(len),
            inactivity: Deltas::new(len),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            source: Deltas::with_capacity(capacity),
            target: Deltas::with_capacity(capacity),
            head: Deltas::with_capacity(capacity),
            inclusion_delay: Deltas::with_capacity(capacity),
            inactivity: Deltas::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Move the entries of `other` onto the end of `self`, component by component.
    pub fn append(&mut self, other: &mut AttestationDeltas) {
        self.source.append(&mut other.source);
        self.target.append(&mut other.target);
        self.head.append(&mut other.head);
        self.inclusion_delay.append(&mut other.inclusion_delay);
        self.inactivity.append(&mut other.inactivity);
    }

    /// Sum the five components into one ledger.
    pub fn total(&self) -> Result<Deltas, Error> {
        let mut total = self.source.clone();
        total.combine(&self.target)?;
        total.combine(&self.head)?;
        total.combine(&self.inclusion_delay)?;
        total.combine(&self.inactivity)?;
        Ok(total)
    }
}

/// Apply `deltas` to `balances`, erroring on overflow above but saturating at zero below.
///
/// Rewards are applied before penalties.
pub fn apply_deltas(balances: &mut [u64], deltas: &Deltas) -> Result<(), Error> {
    if balances.len() != deltas.len() {
        return Err(Error::DeltasInconsistent);
    }

    for ((balance, reward), penalty) in balances
        .iter_mut()
        .zip(&deltas.rewards)
        .zip(&deltas.penalties)
    {
        increase_balance_directly(balance, *reward)?;
        decrease_balance_directly(balance, *penalty)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_combine() {
        let mut a = Delta::default();
        a.reward(3).unwrap();
        a.penalize(1).unwrap();

        let mut b = Delta::default();
        b.reward(2).unwrap();
        a.combine(b).unwrap();

        assert_eq!(
            a,
            Delta {
                rewards: 5,
                penalties: 1
            }
        );
        assert!(a.reward(u64::MAX).is_err());
    }

    #[test]
    fn deltas_index_bounds() {
        let mut deltas = Deltas::new(2);
        deltas.add_reward(1, 10).unwrap();
        deltas.add_penalty(0, 4).unwrap();

        assert_eq!(deltas.rewards(), &[0, 10]);
        assert_eq!(deltas.penalties(), &[4, 0]);
        assert_eq!(deltas.add_reward(2, 1), Err(Error::DeltaOutOfBounds(2)));
    }

    #[test]
    fn totals_sum_every_component() {
        let mut deltas = AttestationDeltas::new(2);
        deltas.source.add_reward(0, 1).unwrap();
        deltas.target.add_reward(0, 2).unwrap();
        deltas.head.add_penalty(1, 3).unwrap();
        deltas.inclusion_delay.add_reward(1, 4).unwrap();
        deltas.inactivity.add_penalty(1, 5).unwrap();

        let total = deltas.total().unwrap();
        assert_eq!(total.rewards(), &[3, 4]);
        assert_eq!(total.penalties(), &[0, 8]);
    }

    #[test]
    fn combine_rejects_mismatched_lengths() {
        assert_eq!(
            Deltas::new(2).combine(&Deltas::new(3)),
            Err(Error::DeltasInconsistent)
        );
    }

    #[test]
    fn balances_saturate_at_zero() {
        let mut deltas = Deltas::new(3);
        deltas.add_penalty(0, 100).unwrap();
        deltas.add_reward(1, 5).unwrap();
        deltas.add_penalty(1, 8).unwrap();
        deltas.add_reward(2, 7).unwrap();

        let mut balances = vec![50, 2, 0];
        apply_deltas(&mut balances, &deltas).unwrap();

        // Rewards land before penalties, so 2 + 5 - 8 floors at zero.
        assert_eq!(balances, vec![0, 0, 7]);
    }

    #[test]
    fn apply_rejects_mismatched_lengths() {
        let mut balances = vec![1, 2];
        assert_eq!(
            apply_deltas(&mut balances, &Deltas::new(3)),
            Err(Error::DeltasInconsistent)
        );
        assert_eq!(balances, vec![1, 2]);
    }

    #[test]
    fn apply_errors_on_overflow() {
        let mut deltas = Deltas::new(1);
        deltas.add_reward(0, 1).unwrap();

        let mut balances = vec![u64::MAX];
        assert!(apply_deltas(&mut balances, &deltas).is_err());
    }
}
