use self::committee_cache::get_active_validator_indices;
use crate::slot_epoch_macros::int_to_fixed_bytes32;
use crate::*;
use ethereum_hashing::hash;
use safe_arith::{ArithError, SafeArith};
use serde::{Deserialize, Serialize};
use ssz_derive::{Decode, Encode};
use ssz_types::typenum::Unsigned;
use tree_hash::TreeHash;
use tree_hash_derive::TreeHash;

pub use self::committee_cache::CommitteeCache;
pub use self::proposer_sampler::{ProposerSampler, MAX_PROPOSER_SAMPLING_ROUNDS, MAX_RANDOM_BYTE};

mod committee_cache;
mod proposer_sampler;
#[cfg(test)]
mod tests;

pub const CACHED_EPOCHS: usize = 3;

#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    EpochOutOfBounds,
    SlotOutOfBounds,
    UnknownValidator(usize),
    BalancesOutOfBounds(usize),
    UnableToShuffle,
    TooManyValidators,
    InsufficientValidators,
    InsufficientRandaoMixes,
    InsufficientBlockRoots,
    InsufficientIndexRoots,
    NoCommittee {
        slot: Slot,
        index: CommitteeIndex,
    },
    ZeroSlotsPerEpoch,
    /// An aggregation bitfield did not match the length of its committee.
    InvalidBitfield,
    CommitteeCachesOutOfBounds(usize),
    CommitteeCacheUninitialized(Option<RelativeEpoch>),
    /// No candidate was accepted within `MAX_PROPOSER_SAMPLING_ROUNDS`.
    ProposerSamplingExhausted {
        slot: Slot,
        rounds: u64,
    },
    RelativeEpochError(RelativeEpochError),
    SszTypesError(ssz_types::Error),
    ArithError(ArithError),
}

impl From<RelativeEpochError> for Error {
    fn from(e: RelativeEpochError) -> Error {
        Error::RelativeEpochError(e)
    }
}

impl From<ssz_types::Error> for Error {
    fn from(e: ssz_types::Error) -> Error {
        Error::SszTypesError(e)
    }
}

impl From<ArithError> for Error {
    fn from(e: ArithError) -> Error {
        Error::ArithError(e)
    }
}

/// The state of the `BeaconChain` at some slot.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize, Encode, Decode, TreeHash)]
#[serde(bound = "T: EthSpec")]
pub struct BeaconState<T>
where
    T: EthSpec,
{
    // Versioning
    pub genesis_time: u64,
    pub genesis_validators_root: Hash256,
    pub slot: Slot,
    pub fork: Fork,

    // History
    pub block_roots: FixedVector<Hash256, T::SlotsPerHistoricalRoot>,

    // Registry
    pub validators: VariableList<Validator, T::ValidatorRegistryLimit>,
    pub balances: VariableList<u64, T::ValidatorRegistryLimit>,

    // Randomness
    pub randao_mixes: FixedVector<Hash256, T::EpochsPerHistoricalVector>,
    pub active_index_roots: FixedVector<Hash256, T::EpochsPerHistoricalVector>,

    // Attestations
    pub previous_epoch_attestations: VariableList<PendingAttestation<T>, T::MaxPendingAttestations>,
    pub current_epoch_attestations: VariableList<PendingAttestation<T>, T::MaxPendingAttestations>,

    // Finality
    pub justification_bits: BitVector<T::JustificationBitsLength>,
    pub previous_justified_checkpoint: Checkpoint,
    pub current_justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,

    // Caching
    #[serde(skip_serializing, skip_deserializing)]
    #[ssz(skip_serializing, skip_deserializing)]
    #[tree_hash(skip_hashing)]
    pub committee_caches: [CommitteeCache; CACHED_EPOCHS],
}

impl<T: EthSpec> BeaconState<T> {
    /// Create a new BeaconState suitable for genesis.
    ///
    /// Not a complete genesis state, see `TestingBeaconStateBuilder` for that.
    pub fn new(genesis_time: u64, genesis_validators_root: Hash256, spec: &ChainSpec) -> Self {
        BeaconState {
            // Versioning
            genesis_time,
            genesis_validators_root,
            slot: spec.genesis_slot,
            fork: Fork {
                previous_version: spec.genesis_fork_version,
                current_version: spec.genesis_fork_version,
                epoch: T::genesis_epoch(),
            },

            // History
            block_roots: FixedVector::from_elem(Hash256::zero()),

            // Validator registry
            validators: VariableList::empty(), // Set later.
            balances: VariableList::empty(),   // Set later.

            // Randomness
            randao_mixes: FixedVector::from_elem(Hash256::zero()),
            active_index_roots: FixedVector::from_elem(Hash256::zero()),

            // Attestations
            previous_epoch_attestations: VariableList::empty(),
            current_epoch_attestations: VariableList::empty(),

            // Finality
            justification_bits: BitVector::new(),
            previous_justified_checkpoint: Checkpoint::default(),
            current_justified_checkpoint: Checkpoint::default(),
            finalized_checkpoint: Checkpoint::default(),

            // Caching (not in spec)
            committee_caches: [
                CommitteeCache::default(),
                CommitteeCache::default(),
                CommitteeCache::default(),
            ],
        }
    }

    /// Returns the `tree_hash_root` of the state.
    pub fn canonical_root(&self) -> Hash256 {
        self.tree_hash_root()
    }

    /// The epoch corresponding to `self.slot`.
    pub fn current_epoch(&self) -> Epoch {
        self.slot.epoch(T::slots_per_epoch())
    }

    /// The epoch prior to `self.current_epoch()`.
    ///
    /// If the current epoch is the genesis epoch, the genesis_epoch is returned.
    pub fn previous_epoch(&self) -> Epoch {
        let current_epoch = self.current_epoch();
        if current_epoch > T::genesis_epoch() {
            current_epoch - 1
        } else {
            current_epoch
        }
    }

    /// The epoch following `self.current_epoch()`.
    pub fn next_epoch(&self) -> Result<Epoch, Error> {
        Ok(self.current_epoch().safe_add(1)?)
    }

    /// Return the number of committees at ``slot``.
    ///
    /// Makes use of the committee cache and will fail if no cache exists for the slot's epoch.
    pub fn get_committee_count_at_slot(&self, slot: Slot) -> Result<u64, Error> {
        let cache = self.committee_cache_at_slot(slot)?;
        Ok(cache.committees_per_slot())
    }

    /// Compute the number of committees in an entire epoch.
    pub fn get_epoch_committee_count(&self, relative_epoch: RelativeEpoch) -> Result<u64, Error> {
        let cache = self.committee_cache(relative_epoch)?;
        Ok(cache.epoch_committee_count() as u64)
    }

    /// Returns the active validator indices for the given epoch.
    ///
    /// Does not utilize the cache, performs a full iteration over the validator registry.
    pub fn get_active_validator_indices(&self, epoch: Epoch) -> Vec<usize> {
        get_active_validator_indices(&self.validators, epoch)
    }

    /// Get the Beacon committee at the given slot and index.
    ///
    /// Utilises the committee cache.
    pub fn get_beacon_committee(
        &self,
        slot: Slot,
        index: CommitteeIndex,
    ) -> Result<BeaconCommittee, Error> {
        let cache = self.committee_cache_at_slot(slot)?;

        cache
            .get_beacon_committee(slot, index)
            .ok_or(Error::NoCommittee { slot, index })
    }

    /// Get all of the Beacon committees at a given slot.
    ///
    /// Utilises the committee cache.
    pub fn get_beacon_committees_at_slot(&self, slot: Slot) -> Result<Vec<BeaconCommittee>, Error> {
        let cache = self.committee_cache_at_slot(slot)?;
        cache.get_beacon_committees_at_slot(slot)
    }

    /// Returns the beacon proposer index for the `slot`.
    ///
    /// Candidates are drawn from the first committee of the slot. The committee cache for the
    /// slot's epoch must be built.
    pub fn get_beacon_proposer_index(&self, slot: Slot, spec: &ChainSpec) -> Result<usize, Error> {
        let epoch = slot.epoch(T::slots_per_epoch());
        let seed = self.get_seed(epoch, spec)?;
        let first_committee = self
            .committee_cache_at_slot(slot)?
            .first_committee_at_slot(slot)
            .ok_or(Error::SlotOutOfBounds)?;

        self.compute_proposer_index(first_committee, slot, seed, spec)
    }

    /// Sample a proposer for `slot` from `candidates`, weighted by effective balance.
    ///
    /// Returns `InsufficientValidators` when there are no candidates and
    /// `ProposerSamplingExhausted` when no candidate is accepted within
    /// `MAX_PROPOSER_SAMPLING_ROUNDS` hashing rounds.
    pub fn compute_proposer_index(
        &self,
        candidates: &[usize],
        slot: Slot,
        seed: Hash256,
        spec: &ChainSpec,
    ) -> Result<usize, Error> {
        if candidates.is_empty() {
            return Err(Error::InsufficientValidators);
        }

        let epoch = slot.epoch(T::slots_per_epoch());
        for (candidate_index, random_byte) in ProposerSampler::new(candidates, epoch, seed) {
            let effective_balance = self.get_effective_balance(candidate_index)?;
            if effective_balance.safe_mul(MAX_RANDOM_BYTE)?
                >= spec
                    .max_effective_balance
                    .safe_mul(u64::from(random_byte))?
            {
                return Ok(candidate_index);
            }
        }

        Err(Error::ProposerSamplingExhausted {
            slot,
            rounds: MAX_PROPOSER_SAMPLING_ROUNDS,
        })
    }

    /// Safely obtains the index for latest block roots, given some `slot`.
    fn get_latest_block_roots_index(&self, slot: Slot) -> Result<usize, Error> {
        if slot < self.slot && self.slot <= slot.safe_add(self.block_roots.len() as u64)? {
            Ok(slot.as_usize().safe_rem(self.block_roots.len())?)
        } else {
            Err(Error::SlotOutOfBounds)
        }
    }

    /// Return the block root at a recent `slot`.
    ///
    /// Requires `slot < state.slot <= slot + SLOTS_PER_HISTORICAL_ROOT`.
    pub fn get_block_root(&self, slot: Slot) -> Result<&Hash256, Error> {
        let i = self.get_latest_block_roots_index(slot)?;
        self.block_roots.get(i).ok_or(Error::InsufficientBlockRoots)
    }

    /// Return the block root at a recent `epoch`.
    pub fn get_block_root_at_epoch(&self, epoch: Epoch) -> Result<&Hash256, Error> {
        self.get_block_root(epoch.start_slot(T::slots_per_epoch()))
    }

    /// Sets the block root for some given slot.
    ///
    /// Unlike `get_block_root`, the current slot is writable.
    pub fn set_block_root(&mut self, slot: Slot, block_root: Hash256) -> Result<(), Error> {
        let i = slot.as_usize().safe_rem(self.block_roots.len())?;
        *self
            .block_roots
            .get_mut(i)
            .ok_or(Error::InsufficientBlockRoots)? = block_root;
        Ok(())
    }

    /// Index into a historical vector. The vector wraps, so any epoch has a position.
    fn get_historical_vector_index(epoch: Epoch) -> Result<usize, Error> {
        Ok(epoch
            .as_usize()
            .safe_rem(T::EpochsPerHistoricalVector::to_usize())?)
    }

    /// Return the randao mix at a recent ``epoch``.
    pub fn get_randao_mix(&self, epoch: Epoch) -> Result<&Hash256, Error> {
        let i = Self::get_historical_vector_index(epoch)?;
        self.randao_mixes.get(i).ok_or(Error::InsufficientRandaoMixes)
    }

    /// Set the randao mix at a recent ``epoch``.
    pub fn set_randao_mix(&mut self, epoch: Epoch, mix: Hash256) -> Result<(), Error> {
        let i = Self::get_historical_vector_index(epoch)?;
        *self
            .randao_mixes
            .get_mut(i)
            .ok_or(Error::InsufficientRandaoMixes)? = mix;
        Ok(())
    }

    /// Return the root of the active validator indices at ``epoch``.
    pub fn get_active_index_root(&self, epoch: Epoch) -> Result<&Hash256, Error> {
        let i = Self::get_historical_vector_index(epoch)?;
        self.active_index_roots
            .get(i)
            .ok_or(Error::InsufficientIndexRoots)
    }

    /// Set the root of the active validator indices at ``epoch``.
    pub fn set_active_index_root(&mut self, epoch: Epoch, root: Hash256) -> Result<(), Error> {
        let i = Self::get_historical_vector_index(epoch)?;
        *self
            .active_index_roots
            .get_mut(i)
            .ok_or(Error::InsufficientIndexRoots)? = root;
        Ok(())
    }

    /// Compute the root of the validator indices active at `epoch`, as a list of `u64` bounded
    /// by the registry limit.
    pub fn compute_active_index_root(&self, epoch: Epoch) -> Result<Hash256, Error> {
        let indices: VariableList<u64, T::ValidatorRegistryLimit> = VariableList::new(
            self.get_active_validator_indices(epoch)
                .into_iter()
                .map(|i| i as u64)
                .collect(),
        )?;
        Ok(indices.tree_hash_root())
    }

    /// Generate a seed for the given `epoch`.
    ///
    /// `hash(mix ‖ active_index_root ‖ epoch)`, where the mix is taken `MIN_SEED_LOOKAHEAD`
    /// epochs back and the epoch is little-endian, zero-padded to 32 bytes.
    pub fn get_seed(&self, epoch: Epoch, spec: &ChainSpec) -> Result<Hash256, Error> {
        const NUM_MIX_BYTES: usize = 32;
        const NUM_ROOT_BYTES: usize = 32;
        const ROOT_OFFSET: usize = NUM_MIX_BYTES;
        const EPOCH_OFFSET: usize = NUM_MIX_BYTES + NUM_ROOT_BYTES;
        const NUM_EPOCH_BYTES: usize = 32;

        // The historical vector length is added first so `epoch < MIN_SEED_LOOKAHEAD` wraps
        // around instead of underflowing.
        let mix_epoch = epoch
            .safe_add(T::EpochsPerHistoricalVector::to_u64())?
            .safe_sub(spec.min_seed_lookahead)?;
        let mix = self.get_randao_mix(mix_epoch)?;
        let active_index_root = self.get_active_index_root(epoch)?;

        let mut preimage = [0; NUM_MIX_BYTES + NUM_ROOT_BYTES + NUM_EPOCH_BYTES];
        preimage[0..ROOT_OFFSET].copy_from_slice(mix.as_bytes());
        preimage[ROOT_OFFSET..EPOCH_OFFSET].copy_from_slice(active_index_root.as_bytes());
        preimage[EPOCH_OFFSET..].copy_from_slice(&int_to_fixed_bytes32(epoch.as_u64()));

        Ok(Hash256::from_slice(&hash(&preimage)))
    }

    /// Safe indexer for the `validators` list.
    pub fn get_validator(&self, validator_index: usize) -> Result<&Validator, Error> {
        self.validators
            .get(validator_index)
            .ok_or(Error::UnknownValidator(validator_index))
    }

    /// Return the effective balance for a validator with the given `validator_index`.
    pub fn get_effective_balance(&self, validator_index: usize) -> Result<u64, Error> {
        self.get_validator(validator_index)
            .map(|v| v.effective_balance)
    }

    /// Get the balance of a single validator.
    pub fn get_balance(&self, validator_index: usize) -> Result<u64, Error> {
        self.balances
            .get(validator_index)
            .copied()
            .ok_or(Error::BalancesOutOfBounds(validator_index))
    }

    /// Get a mutable reference to the balance of a single validator.
    pub fn get_balance_mut(&mut self, validator_index: usize) -> Result<&mut u64, Error> {
        self.balances
            .get_mut(validator_index)
            .ok_or(Error::BalancesOutOfBounds(validator_index))
    }

    /// Return the combined effective balance of an array of validators.
    ///
    /// The result is never less than `EFFECTIVE_BALANCE_INCREMENT`.
    pub fn get_total_balance<'a, I: IntoIterator<Item = &'a usize>>(
        &self,
        validator_indices: I,
        spec: &ChainSpec,
    ) -> Result<u64, Error> {
        let total_balance = validator_indices
            .into_iter()
            .try_fold(0_u64, |acc, i| -> Result<u64, Error> {
                Ok(acc.safe_add(self.get_effective_balance(*i)?)?)
            })?;
        Ok(std::cmp::max(
            total_balance,
            spec.effective_balance_increment,
        ))
    }

    /// Implementation of `get_total_active_balance`: the total effective balance of validators
    /// active in the current epoch, floored at `EFFECTIVE_BALANCE_INCREMENT`.
    pub fn get_total_active_balance(&self, spec: &ChainSpec) -> Result<u64, Error> {
        let active_indices = self.get_active_validator_indices(self.current_epoch());
        self.get_total_balance(&active_indices, spec)
    }

    /// Get the signature domain, mixing in this state's fork and genesis validators root.
    pub fn get_domain(&self, epoch: Epoch, domain: Domain, spec: &ChainSpec) -> Hash256 {
        spec.get_domain(epoch, domain, &self.fork, self.genesis_validators_root)
    }

    /// Build all committee caches, if they need to be built.
    pub fn build_all_committee_caches(&mut self, spec: &ChainSpec) -> Result<(), Error> {
        self.build_committee_cache(RelativeEpoch::Previous, spec)?;
        self.build_committee_cache(RelativeEpoch::Current, spec)?;
        self.build_committee_cache(RelativeEpoch::Next, spec)?;
        Ok(())
    }

    /// Build a committee cache, unless it is has already been built.
    pub fn build_committee_cache(
        &mut self,
        relative_epoch: RelativeEpoch,
        spec: &ChainSpec,
    ) -> Result<(), Error> {
        let i = Self::committee_cache_index(relative_epoch);
        let is_initialized = self
            .committee_cache_at_index(i)?
            .is_initialized_at(relative_epoch.into_epoch(self.current_epoch()));

        if !is_initialized {
            self.force_build_committee_cache(relative_epoch, spec)?;
        }
        Ok(())
    }

    /// Always builds the requested committee cache, even if it is already initialized.
    pub fn force_build_committee_cache(
        &mut self,
        relative_epoch: RelativeEpoch,
        spec: &ChainSpec,
    ) -> Result<(), Error> {
        let epoch = relative_epoch.into_epoch(self.current_epoch());
        let i = Self::committee_cache_index(relative_epoch);

        *self.committee_cache_at_index_mut(i)? = CommitteeCache::initialized(self, epoch, spec)?;
        Ok(())
    }

    /// Advances the cache for this state into the next epoch.
    ///
    /// This should be used if the `slot` of this state is advanced beyond an epoch boundary.
    ///
    /// Note: this function will not build any new committee caches.
    pub fn advance_caches(&mut self) -> Result<(), Error> {
        self.committee_caches.rotate_left(1);

        let next = Self::committee_cache_index(RelativeEpoch::Next);
        *self.committee_cache_at_index_mut(next)? = CommitteeCache::default();
        Ok(())
    }

    fn committee_cache_index(relative_epoch: RelativeEpoch) -> usize {
        match relative_epoch {
            RelativeEpoch::Previous => 0,
            RelativeEpoch::Current => 1,
            RelativeEpoch::Next => 2,
        }
    }

    /// Get the committee cache for some `slot`.
    ///
    /// Return an error if the cache for the slot's epoch is not initialized.
    fn committee_cache_at_slot(&self, slot: Slot) -> Result<&CommitteeCache, Error> {
        let epoch = slot.epoch(T::slots_per_epoch());
        let relative_epoch = RelativeEpoch::from_epoch(self.current_epoch(), epoch)?;
        self.committee_cache(relative_epoch)
    }

    fn committee_cache_at_index(&self, index: usize) -> Result<&CommitteeCache, Error> {
        self.committee_caches
            .get(index)
            .ok_or(Error::CommitteeCachesOutOfBounds(index))
    }

    fn committee_cache_at_index_mut(&mut self, index: usize) -> Result<&mut CommitteeCache, Error> {
        self.committee_caches
            .get_mut(index)
            .ok_or(Error::CommitteeCachesOutOfBounds(index))
    }

    /// Returns the cache for some `RelativeEpoch`. Returns an error if the cache has not been
    /// initialized.
    pub fn committee_cache(&self, relative_epoch: RelativeEpoch) -> Result<&CommitteeCache, Error> {
        let i = Self::committee_cache_index(relative_epoch);
        let cache = self.committee_cache_at_index(i)?;

        if cache.is_initialized_at(relative_epoch.into_epoch(self.current_epoch())) {
            Ok(cache)
        } else {
            Err(Error::CommitteeCacheUninitialized(Some(relative_epoch)))
        }
    }

    /// Drops the cache, leaving it in an uninitialized state.
    pub fn drop_committee_cache(&mut self, relative_epoch: RelativeEpoch) -> Result<(), Error> {
        *self.committee_cache_at_index_mut(Self::committee_cache_index(relative_epoch))? =
            CommitteeCache::default();
        Ok(())
    }

    /// Drop all caches on the state.
    pub fn drop_all_caches(&mut self) -> Result<(), Error> {
        self.drop_committee_cache(RelativeEpoch::Previous)?;
        self.drop_committee_cache(RelativeEpoch::Current)?;
        self.drop_committee_cache(RelativeEpoch::Next)?;
        Ok(())
    }
}
