mod testing_attestation_builder;
mod testing_attestation_data_builder;
mod testing_beacon_state_builder;

pub use testing_attestation_builder::{AttestationTestTask, TestingAttestationBuilder};
pub use testing_attestation_data_builder::TestingAttestationDataBuilder;
pub use testing_beacon_state_builder::TestingBeaconStateBuilder;
