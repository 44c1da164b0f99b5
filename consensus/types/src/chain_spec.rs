use crate::serde_utils::{fork_from_hex_str, fork_to_hex_str};
use crate::*;
use serde::{Deserialize, Serialize};
use tree_hash::TreeHash;

/// Each of the BLS signature domains.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Domain {
    BeaconProposer,
    BeaconAttester,
    Randao,
}

/// Holds all the "constants" for a BeaconChain.
///
/// Type-level constants (list lengths, `SLOTS_PER_EPOCH`) live on `EthSpec` instead.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainSpec {
    /*
     * Misc
     */
    pub shard_count: usize,
    pub target_committee_size: usize,
    pub shuffle_round_count: u8,

    /*
     *  Gwei values
     */
    pub max_effective_balance: u64,
    pub effective_balance_increment: u64,

    /*
     * Initial Values
     */
    pub genesis_slot: Slot,
    pub far_future_epoch: Epoch,
    #[serde(
        serialize_with = "fork_to_hex_str",
        deserialize_with = "fork_from_hex_str"
    )]
    pub genesis_fork_version: [u8; 4],

    /*
     * Time parameters
     */
    pub min_attestation_inclusion_delay: u64,
    pub min_seed_lookahead: Epoch,
    pub activation_exit_delay: u64,
    pub min_epochs_to_inactivity_penalty: u64,

    /*
     * Reward and penalty quotients
     */
    pub base_reward_factor: u64,
    pub base_rewards_per_epoch: u64,
    pub proposer_reward_quotient: u64,
    pub inactivity_penalty_quotient: u64,

    /*
     * Signature domains
     *
     * Use `ChainSpec::get_domain(..)` to access these values, so the fork version is always
     * mixed in.
     */
    pub(crate) domain_beacon_proposer: u32,
    pub(crate) domain_beacon_attester: u32,
    pub(crate) domain_randao: u32,
}

impl ChainSpec {
    /// Get the domain number, unmodified by the fork.
    pub fn get_domain_constant(&self, domain: Domain) -> u32 {
        match domain {
            Domain::BeaconProposer => self.domain_beacon_proposer,
            Domain::BeaconAttester => self.domain_beacon_attester,
            Domain::Randao => self.domain_randao,
        }
    }

    /// Get the domain that represents the fork meta and signature domain.
    pub fn get_domain(
        &self,
        epoch: Epoch,
        domain: Domain,
        fork: &Fork,
        genesis_validators_root: Hash256,
    ) -> Hash256 {
        let fork_version = fork.get_fork_version(epoch);
        self.compute_domain(domain, fork_version, genesis_validators_root)
    }

    /// Return the 32-byte fork data root for the `current_version` and `genesis_validators_root`.
    pub fn compute_fork_data_root(
        current_version: [u8; 4],
        genesis_validators_root: Hash256,
    ) -> Hash256 {
        ForkData {
            current_version,
            genesis_validators_root,
        }
        .tree_hash_root()
    }

    /// Compute a domain by applying the given `fork_version`.
    ///
    /// The first four bytes are the little-endian domain constant, the remaining 28 are the
    /// leading bytes of the fork data root.
    pub fn compute_domain(
        &self,
        domain: Domain,
        fork_version: [u8; 4],
        genesis_validators_root: Hash256,
    ) -> Hash256 {
        let domain_constant = self.get_domain_constant(domain);

        let mut domain = [0; 32];
        domain[0..4].copy_from_slice(&domain_constant.to_le_bytes());
        domain[4..].copy_from_slice(
            Self::compute_fork_data_root(fork_version, genesis_validators_root)
                .as_bytes()
                .get(..28)
                .unwrap_or(&[0; 28]),
        );

        Hash256::from(domain)
    }

    /// Returns a `ChainSpec` compatible with the production network.
    pub fn mainnet() -> Self {
        Self {
            /*
             * Misc
             */
            shard_count: 1_024,
            target_committee_size: 128,
            shuffle_round_count: 90,

            /*
             *  Gwei values
             */
            max_effective_balance: u64::pow(2, 5) * u64::pow(10, 9),
            effective_balance_increment: u64::pow(10, 9),

            /*
             * Initial Values
             */
            genesis_slot: Slot::new(0),
            far_future_epoch: Epoch::max_value(),
            genesis_fork_version: [0; 4],

            /*
             * Time parameters
             */
            min_attestation_inclusion_delay: 1,
            min_seed_lookahead: Epoch::new(1),
            activation_exit_delay: 4,
            min_epochs_to_inactivity_penalty: 4,

            /*
             * Reward and penalty quotients
             */
            base_reward_factor: 64,
            base_rewards_per_epoch: 5,
            proposer_reward_quotient: 8,
            inactivity_penalty_quotient: u64::pow(2, 25),

            /*
             * Signature domains
             */
            domain_beacon_proposer: 0,
            domain_beacon_attester: 1,
            domain_randao: 2,
        }
    }

    /// Small committees and shuffles, for testing.
    ///
    /// Anything not listed here is inherited from mainnet.
    pub fn minimal() -> Self {
        Self {
            shard_count: 8,
            target_committee_size: 4,
            shuffle_round_count: 10,
            genesis_fork_version: [0, 0, 0, 1],
            ..ChainSpec::mainnet()
        }
    }

    /// Parse a `ChainSpec` from YAML. Absent fields take their mainnet values.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

impl Default for ChainSpec {
    fn default() -> Self {
        Self::mainnet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_spec_can_be_constructed() {
        let spec = ChainSpec::mainnet();
        assert_eq!(spec.max_effective_balance, 32_000_000_000);
        assert_eq!(spec.inactivity_penalty_quotient, 33_554_432);
    }

    #[test]
    fn minimal_overrides_committee_parameters() {
        let minimal = ChainSpec::minimal();
        let mainnet = ChainSpec::mainnet();

        assert_eq!(minimal.target_committee_size, 4);
        assert_eq!(minimal.shard_count, 8);
        assert_eq!(minimal.base_reward_factor, mainnet.base_reward_factor);
    }

    #[test]
    fn yaml_round_trip() {
        let spec = ChainSpec::minimal();
        let yaml = spec.to_yaml_string().unwrap();
        assert_eq!(ChainSpec::from_yaml_str(&yaml).unwrap(), spec);
    }

    #[test]
    fn yaml_missing_fields_default_to_mainnet() {
        let spec = ChainSpec::from_yaml_str("target_committee_size: 7\nshuffle_round_count: 3\n")
            .unwrap();

        assert_eq!(spec.target_committee_size, 7);
        assert_eq!(spec.shuffle_round_count, 3);
        assert_eq!(
            ChainSpec {
                target_committee_size: 128,
                shuffle_round_count: 90,
                ..spec
            },
            ChainSpec::mainnet()
        );
    }

    fn test_domain(domain_type: Domain, spec: &ChainSpec) {
        let genesis_validators_root = Hash256::repeat_byte(9);
        let domain = spec.compute_domain(
            domain_type,
            spec.genesis_fork_version,
            genesis_validators_root,
        );

        let mut expected = spec.get_domain_constant(domain_type).to_le_bytes().to_vec();
        expected.extend_from_slice(
            &ChainSpec::compute_fork_data_root(
                spec.genesis_fork_version,
                genesis_validators_root,
            )[..28],
        );

        assert_eq!(domain.as_bytes(), &expected[..]);
    }

    #[test]
    fn test_get_domain() {
        let spec = ChainSpec::mainnet();

        test_domain(Domain::BeaconProposer, &spec);
        test_domain(Domain::BeaconAttester, &spec);
        test_domain(Domain::Randao, &spec);
    }

    #[test]
    fn get_domain_follows_fork_version() {
        let spec = ChainSpec::mainnet();
        let fork = Fork {
            previous_version: [0, 0, 0, 0],
            current_version: [1, 0, 0, 0],
            epoch: Epoch::new(5),
        };
        let root = Hash256::zero();

        assert_eq!(
            spec.get_domain(Epoch::new(4), Domain::BeaconAttester, &fork, root),
            spec.compute_domain(Domain::BeaconAttester, [0, 0, 0, 0], root)
        );
        assert_eq!(
            spec.get_domain(Epoch::new(5), Domain::BeaconAttester, &fork, root),
            spec.compute_domain(Domain::BeaconAttester, [1, 0, 0, 0], root)
        );
        assert_ne!(
            spec.get_domain(Epoch::new(5), Domain::BeaconAttester, &fork, root),
            spec.get_domain(Epoch::new(5), Domain::BeaconProposer, &fork, root)
        );
    }
}
