use crate::{bytes_to_int64, MAX_LIST_SIZE};
use ethereum_hashing::hash;

const SEED_SIZE: usize = 32;
const ROUND_SIZE: usize = 1;
const POSITION_WINDOW_SIZE: usize = 4;
const PIVOT_VIEW_SIZE: usize = SEED_SIZE + ROUND_SIZE;
const TOTAL_SIZE: usize = SEED_SIZE + ROUND_SIZE + POSITION_WINDOW_SIZE;

/// Return `p(index)` in a pseudorandom permutation `p` of `0...list_size-1` with ``seed`` as
/// entropy.
///
/// Utilizes 'swap or not' shuffling found in
/// https://link.springer.com/content/pdf/10.1007%2F978-3-642-32009-5_1.pdf
/// See the 'generalized domain' algorithm on page 3.
///
/// Returns `None` under any of the following conditions:
///  - `list_size == 0`
///  - `index >= list_size`
///  - `list_size > 2**24`
pub fn compute_shuffled_index(
    index: usize,
    list_size: usize,
    seed: &[u8],
    shuffle_round_count: u8,
) -> Option<usize> {
    if list_size == 0 || index >= list_size || list_size > MAX_LIST_SIZE || seed.len() != SEED_SIZE
    {
        return None;
    }

    let mut buf = [0_u8; TOTAL_SIZE];
    buf[..SEED_SIZE].copy_from_slice(seed);

    let mut index = index;
    for round in 0..shuffle_round_count {
        buf[SEED_SIZE] = round;

        let pivot = bytes_to_int64(&hash(&buf[..PIVOT_VIEW_SIZE])) as usize % list_size;
        index = do_round(&mut buf, index, pivot, list_size);
    }
    Some(index)
}

fn do_round(buf: &mut [u8; TOTAL_SIZE], index: usize, pivot: usize, list_size: usize) -> usize {
    let flip = (pivot + (list_size - index)) % list_size;
    let position = std::cmp::max(index, flip);

    buf[PIVOT_VIEW_SIZE..].copy_from_slice(&((position >> 8) as u32).to_le_bytes());
    let source = hash(&buf[..]);
    let byte = source[(position & 0xff) >> 3];
    let bit = (byte >> (position & 0x07)) & 0x01;

    if bit == 1 {
        flip
    } else {
        index
    }
}
