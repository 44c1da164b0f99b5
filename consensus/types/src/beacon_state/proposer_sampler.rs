use crate::{Epoch, Hash256};
use ethereum_hashing::hash;

/// Upper bound on hashing rounds before proposer sampling gives up.
pub const MAX_PROPOSER_SAMPLING_ROUNDS: u64 = 65_536;
/// A candidate is accepted when `effective_balance * MAX_RANDOM_BYTE >= max_effective_balance *
/// random_byte`.
pub const MAX_RANDOM_BYTE: u64 = 255;

/// Each round hash provides one random byte per candidate.
const CANDIDATES_PER_ROUND: usize = 32;

/// Iterates `(candidate_index, random_byte)` pairs for effective-balance-weighted proposer
/// selection.
///
/// The `i`th item (`i = round * 32 + j`) pairs `candidates[(epoch + i) % len]` with byte `j` of
/// `hash(seed ‖ round)`, where `round` is a little-endian `u64`. Terminates after
/// `MAX_PROPOSER_SAMPLING_ROUNDS` rounds.
pub struct ProposerSampler<'a> {
    candidates: &'a [usize],
    seed: Hash256,
    epoch_offset: u64,
    round: u64,
    position: usize,
    round_hash: Vec<u8>,
}

impl<'a> ProposerSampler<'a> {
    pub fn new(candidates: &'a [usize], epoch: Epoch, seed: Hash256) -> Self {
        let epoch_offset = epoch
            .as_u64()
            .checked_rem(candidates.len() as u64)
            .unwrap_or(0);

        Self {
            candidates,
            seed,
            epoch_offset,
            round: 0,
            position: 0,
            round_hash: vec![],
        }
    }

    fn hash_round(&self) -> Vec<u8> {
        let mut preimage = self.seed.as_bytes().to_vec();
        preimage.extend_from_slice(&self.round.to_le_bytes());
        hash(&preimage)
    }
}

impl<'a> Iterator for ProposerSampler<'a> {
    type Item = (usize, u8);

    fn next(&mut self) -> Option<Self::Item> {
        if self.round >= MAX_PROPOSER_SAMPLING_ROUNDS || self.candidates.is_empty() {
            return None;
        }

        if self.position == 0 {
            self.round_hash = self.hash_round();
        }

        let len = self.candidates.len() as u64;
        let i = self
            .round
            .checked_mul(CANDIDATES_PER_ROUND as u64)?
            .checked_add(self.position as u64)?;
        let offset = self.epoch_offset.checked_add(i.checked_rem(len)?)?.checked_rem(len)?;

        let candidate = *self.candidates.get(offset as usize)?;
        let random_byte = *self.round_hash.get(self.position)?;

        self.position = self.position.checked_add(1)?;
        if self.position == CANDIDATES_PER_ROUND {
            self.position = 0;
            self.round = self.round.checked_add(1)?;
        }

        Some((candidate, random_byte))
    }
}
