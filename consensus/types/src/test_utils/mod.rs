//! Builders for states and attestations with deterministic keys.
//!
//! These are public so downstream crates can use them in their own tests. They panic on misuse.

mod builders;

pub use bls::{generate_deterministic_keypair, generate_deterministic_keypairs, Keypair};
pub use builders::*;
