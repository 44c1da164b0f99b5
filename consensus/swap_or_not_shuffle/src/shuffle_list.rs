use crate::{bytes_to_int64, MAX_LIST_SIZE};
use ethereum_hashing::hash;

const SEED_SIZE: usize = 32;
const ROUND_SIZE: usize = 1;
const POSITION_WINDOW_SIZE: usize = 4;
const PIVOT_VIEW_SIZE: usize = SEED_SIZE + ROUND_SIZE;
const TOTAL_SIZE: usize = SEED_SIZE + ROUND_SIZE + POSITION_WINDOW_SIZE;

/// The hashing buffer: `seed ‖ round ‖ position window`.
struct Buf([u8; TOTAL_SIZE]);

impl Buf {
    fn new(seed: &[u8]) -> Self {
        let mut buf = [0; TOTAL_SIZE];
        buf[0..SEED_SIZE].copy_from_slice(seed);
        Self(buf)
    }

    fn set_round(&mut self, round: u8) {
        self.0[SEED_SIZE] = round;
    }

    /// Returns the pivot for the current round.
    fn get_pivot(&self, list_size: usize) -> usize {
        bytes_to_int64(&hash(&self.0[0..PIVOT_VIEW_SIZE])) as usize % list_size
    }

    /// Returns the 32 bytes of entropy covering the 256 positions starting at `position & !0xff`.
    fn hash_with_position(&mut self, position: usize) -> Vec<u8> {
        self.0[PIVOT_VIEW_SIZE..].copy_from_slice(&((position >> 8) as u32).to_le_bytes());
        hash(&self.0[..])
    }
}

/// Walks `i` upwards from `start` and `j` downwards from `end`, swapping them whenever the bit
/// for position `j` is set.
fn swap_pairs(input: &mut [usize], buf: &mut Buf, start: usize, end: usize, count: usize) {
    let mut source = buf.hash_with_position(end);
    let mut byte_v = source[(end & 0xff) >> 3];

    for offset in 0..count {
        let i = start + offset;
        let j = end - offset;

        if j & 0xff == 0xff {
            source = buf.hash_with_position(j);
        }

        if j & 0x07 == 0x07 {
            byte_v = source[(j & 0xff) >> 3];
        }
        let bit_v = (byte_v >> (j & 0x07)) & 0x01;

        if bit_v == 1 {
            input.swap(i, j);
        }
    }
}

/// Shuffles an entire list in-place.
///
/// Note: this is equivalent to the `compute_shuffled_index` function, except it shuffles an entire
/// list not just a single index. With large lists this function has been observed to be 250x
/// faster than running `compute_shuffled_index` across an entire list.
///
/// Shuffles if `forwards == true`, otherwise un-shuffles.
/// It holds that: shuffle_list(shuffle_list(l, r, s, true), r, s, false) == l
///           and: shuffle_list(shuffle_list(l, r, s, false), r, s, true) == l
///
/// Returns `None` under any of the following conditions:
///  - `list_size == 0`
///  - `list_size > 2**24`
///  - `seed` is not 32 bytes
pub fn shuffle_list(
    mut input: Vec<usize>,
    rounds: u8,
    seed: &[u8],
    forwards: bool,
) -> Option<Vec<usize>> {
    let list_size = input.len();

    if input.is_empty() || list_size > MAX_LIST_SIZE || seed.len() != SEED_SIZE {
        return None;
    }

    if rounds == 0 {
        return Some(input);
    }

    let mut buf = Buf::new(seed);
    let mut r = if forwards { 0 } else { rounds - 1 };

    loop {
        buf.set_round(r);

        let pivot = buf.get_pivot(list_size);

        // Mirror around `pivot / 2`: pairs (i, pivot - i).
        let mirror = (pivot + 1) >> 1;
        swap_pairs(&mut input, &mut buf, 0, pivot, mirror);

        // Mirror around `(pivot + list_size) / 2`: pairs (i, list_size - 1 - (i - pivot - 1)).
        let mirror = (pivot + list_size + 1) >> 1;
        let end = list_size - 1;
        swap_pairs(&mut input, &mut buf, pivot + 1, end, mirror - (pivot + 1));

        if forwards {
            r += 1;
            if r == rounds {
                break;
            }
        } else {
            if r == 0 {
                break;
            }
            r -= 1;
        }
    }

    Some(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_none_for_zero_length_list() {
        assert_eq!(None, shuffle_list(vec![], 90, &[42; 32], true));
    }

    #[test]
    fn returns_none_for_short_seed() {
        assert_eq!(None, shuffle_list(vec![1, 2, 3], 90, &[42, 42], true));
    }

    #[test]
    fn single_element_is_unchanged() {
        assert_eq!(Some(vec![9]), shuffle_list(vec![9], 90, &[1; 32], true));
    }

    #[test]
    fn forwards_then_backwards_is_identity() {
        let input: Vec<usize> = (0..513).collect();
        let seed = [17; 32];

        let shuffled = shuffle_list(input.clone(), 90, &seed, true).unwrap();
        assert_ne!(shuffled, input);

        let unshuffled = shuffle_list(shuffled, 90, &seed, false).unwrap();
        assert_eq!(unshuffled, input);
    }

    #[test]
    fn different_seeds_give_different_shufflings() {
        let input: Vec<usize> = (0..128).collect();

        let a = shuffle_list(input.clone(), 90, &[1; 32], false).unwrap();
        let b = shuffle_list(input, 90, &[2; 32], false).unwrap();
        assert_ne!(a, b);
    }
}
