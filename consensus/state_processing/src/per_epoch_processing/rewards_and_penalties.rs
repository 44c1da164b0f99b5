use super::deltas::{apply_deltas, AttestationDeltas, Delta};
use super::errors::EpochProcessingError as Error;
use super::validator_statuses::{TotalBalances, ValidatorStatus, ValidatorStatuses};
use super::VALIDATOR_CHUNK_SIZE;
use crate::cancellation::CancellationSignal;
use crate::common::base::{get_base_reward, get_proposer_reward};
use rayon::prelude::*;
use safe_arith::SafeArith;
use types::{BeaconState, ChainSpec, EthSpec};

/// Apply attester and proposer rewards for the previous epoch.
///
/// Does nothing at the genesis epoch.
pub fn process_rewards_and_penalties<T: EthSpec, C: CancellationSignal>(
    state: &mut BeaconState<T>,
    validator_statuses: &ValidatorStatuses,
    cancel: &C,
    spec: &ChainSpec,
) -> Result<(), Error> {
    if state.current_epoch() == T::genesis_epoch() {
        return Ok(());
    }

    // Guard against an out-of-bounds during the validator balance update.
    if validator_statuses.statuses.len() != state.balances.len()
        || validator_statuses.statuses.len() != state.validators.len()
    {
        return Err(Error::ValidatorStatusesInconsistent);
    }

    let deltas = compute_deltas(
        &validator_statuses.statuses,
        &validator_statuses.total_balances,
        finality_delay(state)?,
        cancel,
        spec,
    )?;

    apply_deltas(&mut state.balances, &deltas.total()?)
}

/// The number of epochs between the previous epoch and the last finalized epoch.
pub fn finality_delay<T: EthSpec>(state: &BeaconState<T>) -> Result<u64, Error> {
    Ok(state
        .previous_epoch()
        .safe_sub(state.finalized_checkpoint.epoch)?
        .as_u64())
}

/// Returns `true` if the chain has gone long enough without finality to leak inactive stake.
pub fn is_in_inactivity_leak(finality_delay: u64, spec: &ChainSpec) -> bool {
    finality_delay > spec.min_epochs_to_inactivity_penalty
}

/// Compute the reward and penalty ledgers for every validator in `statuses`.
///
/// Validators are processed in parallel chunks, polling `cancel` once per chunk. The chunks are
/// re-assembled in index order and the proposer rewards are credited afterwards, so the result
/// does not depend on scheduling.
pub fn compute_deltas<C: CancellationSignal>(
    statuses: &[ValidatorStatus],
    total_balances: &TotalBalances,
    finality_delay: u64,
    cancel: &C,
    spec: &ChainSpec,
) -> Result<AttestationDeltas, Error> {
    let chunks = statuses
        .par_chunks(VALIDATOR_CHUNK_SIZE)
        .enumerate()
        .map(|(chunk_index, chunk)| {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let offset = chunk_index.safe_mul(VALIDATOR_CHUNK_SIZE)?;
            let mut deltas = AttestationDeltas::with_capacity(chunk.len());
            let mut proposer_rewards = vec![];

            for (i, status) in chunk.iter().enumerate() {
                let (validator_deltas, proposer_reward) = get_validator_deltas(
                    offset.safe_add(i)?,
                    status,
                    total_balances,
                    finality_delay,
                    spec,
                )?;

                deltas.source.push(validator_deltas.source);
                deltas.target.push(validator_deltas.target);
                deltas.head.push(validator_deltas.head);
                deltas.inclusion_delay.push(validator_deltas.inclusion_delay);
                deltas.inactivity.push(validator_deltas.inactivity);
                proposer_rewards.extend(proposer_reward);
            }

            Ok((deltas, proposer_rewards))
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let mut deltas = AttestationDeltas::with_capacity(statuses.len());
    let mut proposer_rewards = vec![];
    for (mut chunk_deltas, chunk_proposer_rewards) in chunks {
        deltas.append(&mut chunk_deltas);
        proposer_rewards.extend(chunk_proposer_rewards);
    }

    for (proposer_index, reward) in proposer_rewards {
        deltas.inclusion_delay.add_reward(proposer_index, reward)?;
    }

    Ok(deltas)
}

#[derive(Default)]
struct ValidatorDeltas {
    source: Delta,
    target: Delta,
    head: Delta,
    inclusion_delay: Delta,
    inactivity: Delta,
}

/// The deltas for a single validator, plus the reward owed to the proposer who included its
/// earliest previous-epoch attestation.
fn get_validator_deltas(
    index: usize,
    status: &ValidatorStatus,
    total_balances: &TotalBalances,
    finality_delay: u64,
    spec: &ChainSpec,
) -> Result<(ValidatorDeltas, Option<(usize, u64)>), Error> {
    let mut deltas = ValidatorDeltas::default();
    let mut proposer_reward_owed = None;

    let base_reward = get_base_reward(
        status.current_epoch_effective_balance,
        total_balances.current_epoch(),
        spec,
    )?;
    let proposer_reward = get_proposer_reward(base_reward, spec)?;
    let is_unslashed_source = status.is_previous_epoch_attester && !status.is_slashed;

    // Inclusion delay, paid to every unslashed source attester.
    if is_unslashed_source {
        let inclusion = status
            .inclusion_info
            .ok_or(Error::InclusionSlotsInconsistent(index))?;

        let max_attester_reward = base_reward.safe_sub(proposer_reward)?;
        deltas
            .inclusion_delay
            .reward(max_attester_reward.safe_div(inclusion.delay)?)?;
        proposer_reward_owed = Some((inclusion.proposer_index, proposer_reward));
    }

    if !status.is_eligible {
        return Ok((deltas, proposer_reward_owed));
    }

    let total_balance = total_balances.current_epoch();
    deltas.source = get_attestation_component_delta(
        is_unslashed_source,
        total_balances.previous_epoch_attesters(),
        total_balance,
        base_reward,
        finality_delay,
        spec,
    )?;
    deltas.target = get_attestation_component_delta(
        status.is_previous_epoch_target_attester && !status.is_slashed,
        total_balances.previous_epoch_target_attesters(),
        total_balance,
        base_reward,
        finality_delay,
        spec,
    )?;
    deltas.head = get_attestation_component_delta(
        status.is_previous_epoch_head_attester && !status.is_slashed,
        total_balances.previous_epoch_head_attesters(),
        total_balance,
        base_reward,
        finality_delay,
        spec,
    )?;
    deltas.inactivity = get_inactivity_penalty_delta(
        status,
        base_reward,
        proposer_reward,
        finality_delay,
        spec,
    )?;

    Ok((deltas, proposer_reward_owed))
}

fn get_attestation_component_delta(
    index_in_unslashed_attesting_indices: bool,
    attesting_balance: u64,
    total_balance: u64,
    base_reward: u64,
    finality_delay: u64,
    spec: &ChainSpec,
) -> Result<Delta, Error> {
    let mut delta = Delta::default();

    if index_in_unslashed_attesting_indices {
        if is_in_inactivity_leak(finality_delay, spec) {
            // Since full base reward will be canceled out by inactivity penalty deltas,
            // optimal participation receives full base reward compensation here.
            delta.reward(base_reward)?;
        } else {
            // Factored out from balance totals to avoid uint64 overflow.
            let increment = spec.effective_balance_increment;
            let reward_numerator = base_reward.safe_mul(attesting_balance.safe_div(increment)?)?;
            delta.reward(reward_numerator.safe_div(total_balance.safe_div(increment)?)?)?;
        }
    } else {
        delta.penalize(base_reward)?;
    }

    Ok(delta)
}

fn get_inactivity_penalty_delta(
    status: &ValidatorStatus,
    base_reward: u64,
    proposer_reward: u64,
    finality_delay: u64,
    spec: &ChainSpec,
) -> Result<Delta, Error> {
    let mut delta = Delta::default();

    if is_in_inactivity_leak(finality_delay, spec) {
        // Cancel out the maximum attester reward, leaving only the proposer's share as a loss.
        delta.penalize(
            spec.base_rewards_per_epoch
                .safe_mul(base_reward)?
                .safe_sub(proposer_reward)?,
        )?;

        // Additionally, all validators whose FFG target didn't match are penalized extra.
        if !status.is_previous_epoch_target_attester || status.is_slashed {
            delta.penalize(
                status
                    .current_epoch_effective_balance
                    .safe_mul(finality_delay)?
                    .safe_div(spec.inactivity_penalty_quotient)?,
            )?;
        }
    }

    Ok(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::NeverCancel;
    use crate::per_epoch_processing::validator_statuses::InclusionInfo;
    use std::sync::atomic::AtomicBool;
    use types::test_utils::TestingBeaconStateBuilder;
    use types::MinimalEthSpec;

    type E = MinimalEthSpec;

    fn attester(proposer_index: usize, delay: u64) -> ValidatorStatus {
        ValidatorStatus {
            is_previous_epoch_attester: true,
            is_previous_epoch_target_attester: true,
            is_previous_epoch_head_attester: true,
            inclusion_info: Some(InclusionInfo {
                delay,
                proposer_index,
            }),
            ..ValidatorStatus::default()
        }
    }

    /// Statuses and totals for `n` genesis validators where the first `attesting` all attested,
    /// each included by validator 0 with a delay of one.
    fn setup(
        spec: &ChainSpec,
        n: usize,
        attesting: usize,
    ) -> (Vec<ValidatorStatus>, TotalBalances) {
        let (state, _) =
            TestingBeaconStateBuilder::<E>::from_deterministic_keypairs(n, spec).build();
        let mut validator_statuses = ValidatorStatuses::new(&state, spec).unwrap();

        for status in validator_statuses.statuses.iter_mut().take(attesting) {
            status.update(&attester(0, 1));
        }
        validator_statuses
            .sum_attesting_balances(&NeverCancel)
            .unwrap();

        (validator_statuses.statuses, validator_statuses.total_balances)
    }

    #[test]
    fn full_participation_rewards_every_component() {
        let spec = E::default_spec();
        let (statuses, totals) = setup(&spec, 8, 8);

        let deltas = compute_deltas(&statuses, &totals, 0, &NeverCancel, &spec).unwrap();
        let base = get_base_reward(spec.max_effective_balance, totals.current_epoch(), &spec)
            .unwrap();
        let proposer_reward = get_proposer_reward(base, &spec).unwrap();

        for i in 0..8 {
            assert_eq!(deltas.source.get(i).unwrap(), Delta { rewards: base, penalties: 0 });
            assert_eq!(deltas.target.get(i).unwrap(), Delta { rewards: base, penalties: 0 });
            assert_eq!(deltas.head.get(i).unwrap(), Delta { rewards: base, penalties: 0 });
            assert_eq!(deltas.inactivity.get(i).unwrap(), Delta::default());
        }

        // Validator 0 proposed every inclusion, so it collects every proposer share.
        assert_eq!(
            deltas.inclusion_delay.rewards()[0],
            base - proposer_reward + 8 * proposer_reward
        );
        assert_eq!(deltas.inclusion_delay.rewards()[1], base - proposer_reward);
    }

    #[test]
    fn non_attesters_are_penalized() {
        let spec = E::default_spec();
        let (statuses, totals) = setup(&spec, 8, 6);

        let deltas = compute_deltas(&statuses, &totals, 0, &NeverCancel, &spec).unwrap();
        let base = get_base_reward(spec.max_effective_balance, totals.current_epoch(), &spec)
            .unwrap();

        // Rewards scale with the attesting share.
        assert_eq!(deltas.source.rewards()[0], base * 6 / 8);
        assert_eq!(deltas.source.penalties()[7], base);
        assert_eq!(deltas.target.penalties()[7], base);
        assert_eq!(deltas.head.penalties()[7], base);
        assert_eq!(deltas.inclusion_delay.get(7).unwrap(), Delta::default());
    }

    #[test]
    fn leak_penalizes_non_target_attesters() {
        let spec = E::default_spec();
        let (statuses, totals) = setup(&spec, 8, 6);
        let finality_delay = spec.min_epochs_to_inactivity_penalty + 1;
        assert!(is_in_inactivity_leak(finality_delay, &spec));
        assert!(!is_in_inactivity_leak(
            spec.min_epochs_to_inactivity_penalty,
            &spec
        ));

        let deltas =
            compute_deltas(&statuses, &totals, finality_delay, &NeverCancel, &spec).unwrap();
        let base = get_base_reward(spec.max_effective_balance, totals.current_epoch(), &spec)
            .unwrap();
        let proposer_reward = get_proposer_reward(base, &spec).unwrap();
        let leak_penalty = spec.base_rewards_per_epoch * base - proposer_reward;

        // Attesters get the full base reward while leaking.
        assert_eq!(deltas.source.rewards()[0], base);
        assert_eq!(deltas.inactivity.penalties()[0], leak_penalty);
        assert_eq!(
            deltas.inactivity.penalties()[7],
            leak_penalty
                + spec.max_effective_balance * finality_delay / spec.inactivity_penalty_quotient
        );
    }

    #[test]
    fn ineligible_validators_only_get_inclusion_rewards() {
        let spec = E::default_spec();
        let (mut statuses, totals) = setup(&spec, 8, 8);
        statuses[3].is_eligible = false;

        let deltas = compute_deltas(&statuses, &totals, 0, &NeverCancel, &spec).unwrap();
        assert_eq!(deltas.source.get(3).unwrap(), Delta::default());
        assert_eq!(deltas.target.get(3).unwrap(), Delta::default());
        assert!(deltas.inclusion_delay.rewards()[3] > 0);
    }

    #[test]
    fn missing_inclusion_info() {
        let spec = E::default_spec();
        let (mut statuses, totals) = setup(&spec, 8, 8);
        statuses[5].inclusion_info = None;

        assert_eq!(
            compute_deltas(&statuses, &totals, 0, &NeverCancel, &spec),
            Err(Error::InclusionSlotsInconsistent(5))
        );
    }

    #[test]
    fn cancelled() {
        let spec = E::default_spec();
        let (statuses, totals) = setup(&spec, 8, 8);

        assert_eq!(
            compute_deltas(&statuses, &totals, 0, &AtomicBool::new(true), &spec),
            Err(Error::Cancelled)
        );
    }
}
