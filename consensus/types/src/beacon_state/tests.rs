#![cfg(test)]
use crate::test_utils::*;
use crate::*;
use ethereum_hashing::hash;
use ssz::{Decode, Encode};

type E = MinimalEthSpec;

fn new_state(validator_count: usize, slot: Slot) -> BeaconState<E> {
    let spec = E::default_spec();
    let mut builder =
        TestingBeaconStateBuilder::<E>::from_deterministic_keypairs(validator_count, &spec);
    builder.teleport_to_slot(slot).fill_block_roots();
    builder.build_caches(&spec).expect("should build caches");
    builder.build().0
}

#[test]
fn epochs_at_genesis() {
    let state = new_state(16, Slot::new(0));

    assert_eq!(state.current_epoch(), Epoch::new(0));
    assert_eq!(state.previous_epoch(), Epoch::new(0));
    assert_eq!(state.next_epoch(), Ok(Epoch::new(1)));
}

#[test]
fn block_root_bounds() {
    let history = E::slots_per_historical_root() as u64;
    let state = new_state(16, Slot::new(history + 6));

    // The current slot is not yet known.
    assert_eq!(state.get_block_root(state.slot), Err(Error::SlotOutOfBounds));
    assert_eq!(
        state.get_block_root(state.slot + 1),
        Err(Error::SlotOutOfBounds)
    );
    // Older than the history window.
    assert_eq!(state.get_block_root(Slot::new(5)), Err(Error::SlotOutOfBounds));

    assert!(state.get_block_root(Slot::new(6)).is_ok());
    assert!(state.get_block_root(state.slot - 1).is_ok());
    // The buffer wraps.
    assert_eq!(
        *state.get_block_root(Slot::new(history + 1)).unwrap(),
        state.block_roots[1]
    );
}

#[test]
fn set_block_root_accepts_the_current_slot() {
    let mut state = new_state(16, Slot::new(3));
    let root = Hash256::repeat_byte(9);

    state.set_block_root(state.slot, root).unwrap();
    state.slot += 1;

    assert_eq!(*state.get_block_root(Slot::new(3)).unwrap(), root);
}

#[test]
fn historical_vectors_wrap() {
    let mut state = new_state(16, Slot::new(0));
    let vector_len = E::epochs_per_historical_vector() as u64;
    let mix = Hash256::repeat_byte(3);

    state.set_randao_mix(Epoch::new(vector_len + 2), mix).unwrap();
    assert_eq!(*state.get_randao_mix(Epoch::new(2)).unwrap(), mix);

    state
        .set_active_index_root(Epoch::new(2 * vector_len), mix)
        .unwrap();
    assert_eq!(*state.get_active_index_root(Epoch::new(0)).unwrap(), mix);
}

#[test]
fn seed_preimage() {
    let spec = E::default_spec();
    let mut state = new_state(16, Slot::new(0));
    let epoch = Epoch::new(5);
    let mix = Hash256::repeat_byte(0xaa);
    let index_root = Hash256::repeat_byte(0xbb);

    let mix_epoch = epoch + E::epochs_per_historical_vector() as u64 - spec.min_seed_lookahead;
    state.set_randao_mix(mix_epoch, mix).unwrap();
    state.set_active_index_root(epoch, index_root).unwrap();

    let mut preimage = vec![];
    preimage.extend_from_slice(mix.as_bytes());
    preimage.extend_from_slice(index_root.as_bytes());
    preimage.extend_from_slice(&5_u64.to_le_bytes());
    preimage.extend_from_slice(&[0; 24]);

    assert_eq!(
        state.get_seed(epoch, &spec),
        Ok(Hash256::from_slice(&hash(&preimage)))
    );
}

#[test]
fn total_balance_is_floored() {
    let spec = E::default_spec();
    let mut state = new_state(4, Slot::new(0));

    let none: Vec<usize> = vec![];
    assert_eq!(
        state.get_total_balance(&none, &spec),
        Ok(spec.effective_balance_increment)
    );
    assert_eq!(
        state.get_total_balance(&[0, 1], &spec),
        Ok(2 * spec.max_effective_balance)
    );
    assert_eq!(
        state.get_total_balance(&[99], &spec),
        Err(Error::UnknownValidator(99))
    );

    for validator in state.validators.iter_mut() {
        validator.effective_balance = 0;
    }
    assert_eq!(
        state.get_total_active_balance(&spec),
        Ok(spec.effective_balance_increment)
    );
}

#[test]
fn proposer_comes_from_first_committee() {
    let spec = E::default_spec();
    let state = new_state(64, Slot::new(E::slots_per_epoch()));

    for slot in state.current_epoch().slot_iter(E::slots_per_epoch()) {
        let proposer = state.get_beacon_proposer_index(slot, &spec).unwrap();
        let first_committee = state.get_beacon_committee(slot, 0).unwrap().committee;
        assert!(first_committee.contains(&proposer));
    }
}

#[test]
fn proposer_sampling_is_balance_weighted() {
    let spec = E::default_spec();
    let mut state = new_state(4, Slot::new(0));
    let seed = Hash256::repeat_byte(1);
    let candidates = [2, 3];

    assert_eq!(
        state.compute_proposer_index(&[], Slot::new(0), seed, &spec),
        Err(Error::InsufficientValidators)
    );

    // A full balance validator is accepted on its first draw.
    assert_eq!(
        state.compute_proposer_index(&[3], Slot::new(0), seed, &spec),
        Ok(3)
    );

    // A validator without balance is only accepted on a zero byte.
    state.validators[2].effective_balance = 0;
    let expected = ProposerSampler::new(&candidates, Epoch::new(0), seed)
        .find(|(candidate, random_byte)| *candidate == 3 || *random_byte == 0)
        .map(|(candidate, _)| candidate)
        .unwrap();
    assert_eq!(
        state.compute_proposer_index(&candidates, Slot::new(0), seed, &spec),
        Ok(expected)
    );
}

#[test]
fn cache_access_requires_build() {
    let spec = E::default_spec();
    let mut state = new_state(16, Slot::new(0));

    state.drop_all_caches().unwrap();
    assert_eq!(
        state.get_committee_count_at_slot(Slot::new(0)),
        Err(Error::CommitteeCacheUninitialized(Some(
            RelativeEpoch::Current
        )))
    );
    assert!(state.get_beacon_proposer_index(Slot::new(0), &spec).is_err());

    state.build_all_committee_caches(&spec).unwrap();
    assert!(state.get_committee_count_at_slot(Slot::new(0)).is_ok());
}

#[test]
fn advance_caches_rotates() {
    let spec = E::default_spec();
    let mut state = new_state(32, Slot::new(2 * E::slots_per_epoch()));

    let current = state.committee_cache(RelativeEpoch::Current).unwrap().clone();
    let next = state.committee_cache(RelativeEpoch::Next).unwrap().clone();

    state.slot += E::slots_per_epoch();
    state.advance_caches().unwrap();

    assert_eq!(state.committee_cache(RelativeEpoch::Previous), Ok(&current));
    assert_eq!(state.committee_cache(RelativeEpoch::Current), Ok(&next));
    assert!(state.committee_cache(RelativeEpoch::Next).is_err());

    state
        .build_committee_cache(RelativeEpoch::Next, &spec)
        .unwrap();
    assert!(state.committee_cache(RelativeEpoch::Next).is_ok());
}

#[test]
fn relative_epoch_lookup_outside_window() {
    let state = new_state(16, Slot::new(4 * E::slots_per_epoch()));

    assert!(state
        .get_beacon_committee(Slot::new(E::slots_per_epoch()), 0)
        .is_err());
    assert!(state
        .get_beacon_committee(Slot::new(6 * E::slots_per_epoch()), 0)
        .is_err());
}

#[test]
fn ssz_round_trip_skips_caches() {
    let mut state = new_state(8, Slot::new(1));
    state.justification_bits.set(1, true).unwrap();

    let decoded = BeaconState::<E>::from_ssz_bytes(&state.as_ssz_bytes()).unwrap();

    assert_eq!(decoded.slot, state.slot);
    assert_eq!(decoded.validators, state.validators);
    assert_eq!(decoded.justification_bits, state.justification_bits);
    assert_eq!(decoded.canonical_root(), state.canonical_root());
    assert!(decoded.committee_cache(RelativeEpoch::Current).is_err());
}

#[test]
fn yaml_round_trip() {
    let mut state = new_state(4, Slot::new(1));
    state.drop_all_caches().unwrap();

    let yaml = serde_yaml::to_string(&state).unwrap();
    let decoded: BeaconState<E> = serde_yaml::from_str(&yaml).unwrap();

    assert_eq!(decoded, state);
}
