use super::validator_statuses::{InclusionInfo, TotalBalances, ValidatorStatus};

/// Provides a summary of validator participation during the epoch.
#[derive(PartialEq, Debug, Clone)]
pub struct EpochProcessingSummary {
    pub total_balances: TotalBalances,
    pub statuses: Vec<ValidatorStatus>,
}

impl EpochProcessingSummary {
    /// Returns the sum of the effective balance of all validators in the current epoch.
    pub fn current_epoch_total_active_balance(&self) -> u64 {
        self.total_balances.current_epoch()
    }

    /// Returns the sum of the effective balance of all validators in the current epoch who
    /// included an attestation that matched the target.
    pub fn current_epoch_target_attesting_balance(&self) -> u64 {
        self.total_balances.current_epoch_target_attesters()
    }

    /// Returns the sum of the effective balance of all validators in the previous epoch.
    pub fn previous_epoch_total_active_balance(&self) -> u64 {
        self.total_balances.previous_epoch()
    }

    /// Returns the sum of the effective balance of all validators in the previous epoch who
    /// included an attestation that matched the target.
    pub fn previous_epoch_target_attesting_balance(&self) -> u64 {
        self.total_balances.previous_epoch_target_attesters()
    }

    /// Returns the sum of the effective balance of all validators in the previous epoch who
    /// included an attestation that matched the head.
    pub fn previous_epoch_head_attesting_balance(&self) -> u64 {
        self.total_balances.previous_epoch_head_attesters()
    }

    /// Returns `true` if `val_index` was included in the active validator indices in the previous
    /// epoch.
    ///
    /// Always returns `false` for an unknown `val_index`.
    pub fn is_active_in_previous_epoch(&self, val_index: usize) -> bool {
        self.statuses
            .get(val_index)
            .map_or(false, |s| s.is_active_in_previous_epoch)
    }

    /// Returns `true` if `val_index` had a source-matching attestation included on chain in the
    /// previous epoch.
    pub fn is_previous_epoch_source_attester(&self, val_index: usize) -> bool {
        self.statuses
            .get(val_index)
            .map_or(false, |s| s.is_previous_epoch_attester)
    }

    /// Returns `true` if `val_index` had a target-matching attestation included on chain in the
    /// previous epoch.
    pub fn is_previous_epoch_target_attester(&self, val_index: usize) -> bool {
        self.statuses
            .get(val_index)
            .map_or(false, |s| s.is_previous_epoch_target_attester)
    }

    /// Returns `true` if `val_index` had a head-matching attestation included on chain in the
    /// previous epoch.
    pub fn is_previous_epoch_head_attester(&self, val_index: usize) -> bool {
        self.statuses
            .get(val_index)
            .map_or(false, |s| s.is_previous_epoch_head_attester)
    }

    /// Returns information about the inclusion distance for `val_index` for the previous epoch.
    ///
    /// Returns `None` for an unknown `val_index` or one with no attestation included on chain.
    pub fn previous_epoch_inclusion_info(&self, val_index: usize) -> Option<InclusionInfo> {
        self.statuses.get(val_index).and_then(|s| s.inclusion_info)
    }
}
