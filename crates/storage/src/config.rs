use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError};
use crate::models::CreditTier;

/// Thresholds and policy switches consulted by every engine component.
///
/// Unset fields fall back to [`EngineConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scores at or below this value are blacklisted.
    pub blacklist_threshold: i32,
    /// Scores at or above this value are excellent.
    pub excellent_threshold: i32,
    /// Lowest score the ledger will store.
    pub credit_floor: i32,
    /// Score given to a newly created volunteer.
    pub initial_credit: i32,
    pub no_show_penalty: i32,
    pub late_cancel_penalty: i32,
    pub activity_completion_bonus: i32,
    /// Hours before `start_time` after which self-cancellation is late.
    pub cancel_deadline_hours: i64,
    /// When false, unregistering inside the cancel window is refused instead of penalised.
    pub allow_late_cancel: bool,
    /// `complete()` requires approved materials when set.
    pub require_materials_approval: bool,
    /// Enables the time-based completion sweep.
    pub auto_complete_activities: bool,
    pub under_subscription_window_days: i64,
    /// Percentage of `min_participants` below which an activity is at risk.
    pub under_subscription_percent: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            blacklist_threshold: 0,
            excellent_threshold: 80,
            credit_floor: 0,
            initial_credit: 100,
            no_show_penalty: 10,
            late_cancel_penalty: 5,
            activity_completion_bonus: 2,
            cancel_deadline_hours: 24,
            allow_late_cancel: true,
            require_materials_approval: true,
            auto_complete_activities: false,
            under_subscription_window_days: 3,
            under_subscription_percent: 80,
        }
    }
}

/// Longest cancel window accepted, one year.
const MAX_CANCEL_DEADLINE_HOURS: i64 = 24 * 365;
const MAX_WINDOW_DAYS: i64 = 365;

impl EngineConfig {
    /// Reject combinations that would invert penalties or overlap tiers.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("no_show_penalty", self.no_show_penalty),
            ("late_cancel_penalty", self.late_cancel_penalty),
            ("activity_completion_bonus", self.activity_completion_bonus),
        ] {
            if value < 0 {
                return Err(StorageError::Validation(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }
        if self.excellent_threshold <= self.blacklist_threshold {
            return Err(StorageError::Validation(format!(
                "excellent_threshold ({}) must be above blacklist_threshold ({})",
                self.excellent_threshold, self.blacklist_threshold
            )));
        }
        if self.initial_credit < self.credit_floor {
            return Err(StorageError::Validation(format!(
                "initial_credit ({}) is below credit_floor ({})",
                self.initial_credit, self.credit_floor
            )));
        }
        if !(0..=MAX_CANCEL_DEADLINE_HOURS).contains(&self.cancel_deadline_hours) {
            return Err(StorageError::Validation(format!(
                "cancel_deadline_hours must be between 0 and {MAX_CANCEL_DEADLINE_HOURS}"
            )));
        }
        if !(0..=MAX_WINDOW_DAYS).contains(&self.under_subscription_window_days) {
            return Err(StorageError::Validation(format!(
                "under_subscription_window_days must be between 0 and {MAX_WINDOW_DAYS}"
            )));
        }
        if self.under_subscription_percent > 100 {
            return Err(StorageError::Validation(
                "under_subscription_percent must be at most 100".to_string(),
            ));
        }
        Ok(())
    }

    /// Derives the eligibility tier for a raw score. This is the only place tiers are computed.
    pub fn tier_for(&self, credit_score: i32) -> CreditTier {
        if credit_score <= self.blacklist_threshold {
            CreditTier::Blacklisted
        } else if credit_score >= self.excellent_threshold {
            CreditTier::Excellent
        } else {
            CreditTier::Normal
        }
    }

    /// Applies `delta` to `score`, clamping the result at the configured floor.
    pub fn clamp_score(&self, score: i32, delta: i32) -> i32 {
        score.saturating_add(delta).max(self.credit_floor)
    }
}
