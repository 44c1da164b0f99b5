use integer_sqrt::IntegerSquareRoot;
use safe_arith::{ArithError, SafeArith};
use types::*;

/// Returns the base reward for a validator with `effective_balance`.
///
/// `total_active_balance` should be `get_total_active_balance(state, spec)`, which is never zero.
pub fn get_base_reward(
    effective_balance: u64,
    total_active_balance: u64,
    spec: &ChainSpec,
) -> Result<u64, ArithError> {
    effective_balance
        .safe_mul(spec.base_reward_factor)?
        .safe_div(total_active_balance.integer_sqrt())?
        .safe_div(spec.base_rewards_per_epoch)
}

/// The share of an attester's base reward paid to the proposer who included the attestation.
pub fn get_proposer_reward(base_reward: u64, spec: &ChainSpec) -> Result<u64, ArithError> {
    base_reward.safe_div(spec.proposer_reward_quotient)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_reward_for_max_balance() {
        let spec = ChainSpec::mainnet();
        // 64 validators at 32 ETH.
        let total = 64 * spec.max_effective_balance;

        let expected = spec.max_effective_balance * spec.base_reward_factor
            / total.integer_sqrt()
            / spec.base_rewards_per_epoch;
        assert_eq!(
            get_base_reward(spec.max_effective_balance, total, &spec),
            Ok(expected)
        );
        assert_eq!(get_base_reward(0, total, &spec), Ok(0));
        assert_eq!(
            get_base_reward(spec.max_effective_balance, 0, &spec),
            Err(ArithError::DivisionByZero)
        );
    }

    #[test]
    fn proposer_reward_is_a_fraction() {
        let spec = ChainSpec::mainnet();
        assert_eq!(
            get_proposer_reward(spec.proposer_reward_quotient * 5, &spec),
            Ok(5)
        );
    }
}
