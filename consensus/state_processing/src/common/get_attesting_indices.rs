use types::*;

/// Returns validator indices which participated in the attestation, sorted by increasing index.
///
/// The `bitlist` must have exactly one bit per member of `committee`.
pub fn get_attesting_indices<T: EthSpec>(
    committee: &[usize],
    bitlist: &BitList<T::MaxValidatorsPerCommittee>,
) -> Result<Vec<u64>, BeaconStateError> {
    if bitlist.len() != committee.len() {
        return Err(BeaconStateError::InvalidBitfield);
    }

    let mut indices = Vec::with_capacity(bitlist.num_set_bits());

    for (i, validator_index) in committee.iter().enumerate() {
        if let Ok(true) = bitlist.get(i) {
            indices.push(*validator_index as u64)
        }
    }

    indices.sort_unstable();

    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    type E = MinimalEthSpec;

    fn bits(set: &[bool]) -> BitList<<E as EthSpec>::MaxValidatorsPerCommittee> {
        let mut bitlist = BitList::with_capacity(set.len()).unwrap();
        for (i, bit) in set.iter().enumerate() {
            bitlist.set(i, *bit).unwrap();
        }
        bitlist
    }

    #[test]
    fn indices_are_ascending() {
        let committee = [42, 7, 19, 3, 11];
        let bitlist = bits(&[true, true, false, true, true]);

        assert_eq!(
            get_attesting_indices::<E>(&committee, &bitlist),
            Ok(vec![3, 7, 11, 42])
        );
    }

    #[test]
    fn bits_can_be_recovered_from_indices() {
        let committee = [42, 7, 19, 3, 11];
        let set = [false, true, true, false, true];

        let indices = get_attesting_indices::<E>(&committee, &bits(&set)).unwrap();
        let recovered: Vec<bool> = committee
            .iter()
            .map(|v| indices.contains(&(*v as u64)))
            .collect();

        assert_eq!(recovered, set);
    }

    #[test]
    fn bitfield_length_must_match_committee() {
        let committee = [1, 2, 3, 4, 5];

        assert_eq!(
            get_attesting_indices::<E>(&committee, &bits(&[true; 4])),
            Err(BeaconStateError::InvalidBitfield)
        );
        assert_eq!(
            get_attesting_indices::<E>(&committee, &bits(&[true; 6])),
            Err(BeaconStateError::InvalidBitfield)
        );
    }
}
