use super::errors::{BlockOperationError, IndexedAttestationInvalid as Invalid};
use bls::SignatureVerifier;
use itertools::Itertools;
use types::*;

type Result<T> = std::result::Result<T, BlockOperationError<Invalid>>;

fn error(reason: Invalid) -> BlockOperationError<Invalid> {
    BlockOperationError::invalid(reason)
}

/// Verify an `IndexedAttestation`.
///
/// The aggregate signature is checked last, and only once every index is known to be valid.
pub fn is_valid_indexed_attestation<T: EthSpec, V: SignatureVerifier>(
    state: &BeaconState<T>,
    indexed_attestation: &IndexedAttestation<T>,
    verifier: &V,
    spec: &ChainSpec,
) -> Result<()> {
    let indices = &indexed_attestation.attesting_indices;

    // Verify that indices aren't empty
    verify!(!indices.is_empty(), Invalid::IndicesEmpty);

    // Check that indices are sorted and unique
    check_sorted(indices)?;

    // Verify max number of indices
    verify!(
        indices.len() <= T::MaxValidatorsPerCommittee::to_usize(),
        Invalid::MaxIndicesExceed(T::MaxValidatorsPerCommittee::to_usize(), indices.len())
    );

    let pubkeys = indices
        .iter()
        .map(|&validator_index| {
            state
                .validators
                .get(validator_index as usize)
                .map(|validator| validator.pubkey)
                .ok_or_else(|| error(Invalid::UnknownValidator(validator_index)))
        })
        .collect::<Result<Vec<_>>>()?;

    let domain = state.get_domain(
        indexed_attestation.data.target.epoch,
        Domain::BeaconAttester,
        spec,
    );
    let message = indexed_attestation.data.signing_root(domain);

    verify!(
        verifier.fast_aggregate_verify(&pubkeys, message, &indexed_attestation.signature),
        Invalid::BadSignature
    );

    Ok(())
}

/// Returns an error unless `list` is strictly ascending.
fn check_sorted(list: &[u64]) -> Result<()> {
    list.iter()
        .tuple_windows()
        .enumerate()
        .try_for_each(|(i, (x, y))| {
            if x < y {
                Ok(())
            } else {
                Err(error(Invalid::BadValidatorIndicesOrdering(i)))
            }
        })
}
