mod get_attesting_indices;
mod get_indexed_attestation;

pub mod base;

pub use get_attesting_indices::get_attesting_indices;
pub use get_indexed_attestation::get_indexed_attestation;

use safe_arith::SafeArith;
use types::{BeaconState, BeaconStateError, EthSpec};

/// Increase the balance of a validator, erroring upon overflow, as per the spec.
pub fn increase_balance<E: EthSpec>(
    state: &mut BeaconState<E>,
    index: usize,
    delta: u64,
) -> Result<(), BeaconStateError> {
    increase_balance_directly(state.get_balance_mut(index)?, delta)
}

/// Decrease the balance of a validator, saturating upon overflow, as per the spec.
pub fn decrease_balance<E: EthSpec>(
    state: &mut BeaconState<E>,
    index: usize,
    delta: u64,
) -> Result<(), BeaconStateError> {
    decrease_balance_directly(state.get_balance_mut(index)?, delta)
}

/// Increase the balance of a validator, erroring upon overflow, as per the spec.
pub fn increase_balance_directly(balance: &mut u64, delta: u64) -> Result<(), BeaconStateError> {
    balance.safe_add_assign(delta)?;
    Ok(())
}

/// Decrease the balance of a validator, saturating upon overflow, as per the spec.
pub fn decrease_balance_directly(balance: &mut u64, delta: u64) -> Result<(), BeaconStateError> {
    *balance = balance.saturating_sub(delta);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::test_utils::TestingBeaconStateBuilder;
    use types::MinimalEthSpec;

    #[test]
    fn balance_floors_at_zero() {
        let spec = MinimalEthSpec::default_spec();
        let (mut state, _) =
            TestingBeaconStateBuilder::<MinimalEthSpec>::from_deterministic_keypairs(2, &spec)
                .build();

        decrease_balance(&mut state, 0, u64::MAX).unwrap();
        assert_eq!(state.balances[0], 0);

        increase_balance(&mut state, 0, 7).unwrap();
        decrease_balance(&mut state, 0, 8).unwrap();
        assert_eq!(state.balances[0], 0);

        assert_eq!(
            decrease_balance(&mut state, 2, 1),
            Err(BeaconStateError::BalancesOutOfBounds(2))
        );
    }

    #[test]
    fn increase_errors_on_overflow() {
        let mut balance = u64::MAX;
        assert!(increase_balance_directly(&mut balance, 1).is_err());
        assert_eq!(balance, u64::MAX);
    }
}
