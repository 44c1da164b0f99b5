use crate::test_utils::{generate_deterministic_keypairs, Keypair};
use crate::*;
use ethereum_hashing::hash;
use tree_hash::TreeHash;

/// The genesis mix. Any constant will do, it only needs to be stable across runs.
const GENESIS_RANDAO_MIX: u8 = 0x42;

/// Builds a beacon state to be used for testing purposes.
///
/// All validators are active from genesis with `MAX_EFFECTIVE_BALANCE`.
///
/// This struct should **never be used for production purposes.**
#[derive(Clone)]
pub struct TestingBeaconStateBuilder<T: EthSpec> {
    state: BeaconState<T>,
    keypairs: Vec<Keypair>,
}

impl<T: EthSpec> TestingBeaconStateBuilder<T> {
    /// Creates a state with `validator_count` validators, using the deterministic keypairs.
    pub fn from_deterministic_keypairs(validator_count: usize, spec: &ChainSpec) -> Self {
        let keypairs = generate_deterministic_keypairs(validator_count);
        assert_eq!(
            keypairs.len(),
            validator_count,
            "Unable to generate deterministic keypairs"
        );
        Self::from_keypairs(keypairs, spec)
    }

    /// Creates a state where the `i`th validator holds `keypairs[i]`.
    pub fn from_keypairs(keypairs: Vec<Keypair>, spec: &ChainSpec) -> Self {
        let validators = keypairs
            .iter()
            .map(|keypair| {
                let mut withdrawal_credentials = Hash256::from_slice(&hash(keypair.pk.as_bytes()));
                // BLS withdrawal prefix.
                withdrawal_credentials.as_bytes_mut()[0] = 0;

                Validator {
                    pubkey: keypair.pk,
                    withdrawal_credentials,
                    effective_balance: spec.max_effective_balance,
                    slashed: false,
                    activation_eligibility_epoch: T::genesis_epoch(),
                    activation_epoch: T::genesis_epoch(),
                    exit_epoch: spec.far_future_epoch,
                    withdrawable_epoch: spec.far_future_epoch,
                }
            })
            .collect::<Vec<_>>();
        let balances = vec![spec.max_effective_balance; validators.len()];

        let genesis_time = 1_567_052_589; // 29 August, 2019;

        let mut state = BeaconState::new(genesis_time, Hash256::zero(), spec);

        state.validators = VariableList::new(validators).expect("too many validators");
        state.balances = VariableList::new(balances).expect("too many balances");
        state.genesis_validators_root = state.validators.tree_hash_root();

        state.randao_mixes = FixedVector::from_elem(Hash256::repeat_byte(GENESIS_RANDAO_MIX));

        let genesis_active_index_root = state
            .compute_active_index_root(T::genesis_epoch())
            .expect("should compute active index root");
        state.active_index_roots = FixedVector::from_elem(genesis_active_index_root);

        Self { state, keypairs }
    }

    /// Builds the previous, current and next committee caches.
    pub fn build_caches(&mut self, spec: &ChainSpec) -> Result<(), BeaconStateError> {
        self.state.build_all_committee_caches(spec)
    }

    /// Sets the `BeaconState` to be in `slot`, without processing the slots in between.
    ///
    /// Drops all caches, since the committees no longer match the state's epoch.
    pub fn teleport_to_slot(&mut self, slot: Slot) -> &mut Self {
        self.state.slot = slot;
        self.state
            .drop_all_caches()
            .expect("caches should always drop");
        self
    }

    /// Fills `block_roots` so that every slot has a distinct, non-zero root.
    pub fn fill_block_roots(&mut self) -> &mut Self {
        for (i, root) in self.state.block_roots.iter_mut().enumerate() {
            *root = Hash256::from_low_u64_le(i as u64 + 1);
        }
        self
    }

    pub fn state_mut(&mut self) -> &mut BeaconState<T> {
        &mut self.state
    }

    pub fn keypairs(&self) -> &[Keypair] {
        &self.keypairs
    }

    /// Consume the builder and return the `BeaconState` and the keypairs for each validator.
    pub fn build(self) -> (BeaconState<T>, Vec<Keypair>) {
        (self.state, self.keypairs)
    }
}
