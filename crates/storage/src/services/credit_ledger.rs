use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{Result, StorageError};
use crate::models::{CreditEntry, CreditReason, CreditTier, Notification, Role};
use crate::repository::{Directory, Store};

/// Outcome of one ledger posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CreditAdjustment {
    pub volunteer_id: Uuid,
    pub reason: CreditReason,
    pub previous_score: i32,
    pub credit_score: i32,
    pub previous_tier: CreditTier,
    pub tier: CreditTier,
}

impl CreditAdjustment {
    /// A notification is owed whenever a posting moves the volunteer into or out of the blacklist.
    pub fn notification(&self) -> Option<Notification> {
        match (self.previous_tier, self.tier) {
            (CreditTier::Blacklisted, CreditTier::Blacklisted) => None,
            (_, CreditTier::Blacklisted) => Some(Notification::BlacklistEntered {
                volunteer_id: self.volunteer_id,
                credit_score: self.credit_score,
            }),
            (CreditTier::Blacklisted, _) => Some(Notification::BlacklistLifted {
                volunteer_id: self.volunteer_id,
                credit_score: self.credit_score,
            }),
            _ => None,
        }
    }
}

/// A delta waiting to be committed as part of a larger transition.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StagedCredit {
    pub volunteer_id: Uuid,
    pub delta: i32,
    pub reason: CreditReason,
}

/// Single writer of volunteer credit scores.
pub struct CreditLedger<'a> {
    store: &'a Store,
    config: &'a EngineConfig,
}

impl<'a> CreditLedger<'a> {
    pub fn new(store: &'a Store, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    /// Apply `delta` to the volunteer's score, clamped at the configured floor.
    pub fn adjust(
        &self,
        volunteer_id: Uuid,
        delta: i32,
        reason: CreditReason,
        now: DateTime<Utc>,
    ) -> Result<CreditAdjustment> {
        self.adjust_with_note(volunteer_id, delta, reason, None, now)
    }

    pub fn adjust_with_note(
        &self,
        volunteer_id: Uuid,
        delta: i32,
        reason: CreditReason,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<CreditAdjustment> {
        let mut directory = self.store.directory.write();
        let staged = StagedCredit {
            volunteer_id,
            delta,
            reason,
        };
        ensure_volunteers(&directory, std::slice::from_ref(&staged))?;
        Ok(post(&mut directory, self.config, staged, None, note, now))
    }

    /// Post the configured delta for one of the standard reasons.
    pub fn apply_standard(
        &self,
        volunteer_id: Uuid,
        reason: CreditReason,
        now: DateTime<Utc>,
    ) -> Result<CreditAdjustment> {
        let delta = reason.standard_delta(self.config).ok_or_else(|| {
            StorageError::Validation(format!("{reason:?} has no standard credit delta"))
        })?;
        self.adjust(volunteer_id, delta, reason, now)
    }

    /// Administrative override: sets the score outright, bypassing the floor.
    pub fn override_score(
        &self,
        volunteer_id: Uuid,
        credit_score: i32,
        now: DateTime<Utc>,
    ) -> Result<CreditAdjustment> {
        let mut directory = self.store.directory.write();
        let user = directory
            .users
            .get_mut(&volunteer_id)
            .filter(|u| u.role == Role::Volunteer)
            .ok_or(StorageError::NotFound {
                entity: "Volunteer",
                id: volunteer_id,
            })?;

        let previous_score = user.credit_score;
        user.credit_score = credit_score;

        let adjustment = CreditAdjustment {
            volunteer_id,
            reason: CreditReason::AdminOverride,
            previous_score,
            credit_score,
            previous_tier: self.config.tier_for(previous_score),
            tier: self.config.tier_for(credit_score),
        };
        directory.credit_log.push(CreditEntry {
            volunteer_id,
            delta: credit_score - previous_score,
            reason: CreditReason::AdminOverride,
            score_after: credit_score,
            activity_id: None,
            note: None,
            recorded_at: now,
        });

        tracing::info!(%volunteer_id, previous_score, credit_score, "Credit score overridden");
        Ok(adjustment)
    }

    pub fn score_of(&self, volunteer_id: Uuid) -> Result<i32> {
        let directory = self.store.directory.read();
        directory
            .users
            .get(&volunteer_id)
            .filter(|u| u.role == Role::Volunteer)
            .map(|u| u.credit_score)
            .ok_or(StorageError::NotFound {
                entity: "Volunteer",
                id: volunteer_id,
            })
    }

    pub fn tier_of(&self, volunteer_id: Uuid) -> Result<CreditTier> {
        Ok(self.config.tier_for(self.score_of(volunteer_id)?))
    }
}

/// Fail unless every staged posting targets a known volunteer.
pub(crate) fn ensure_volunteers(directory: &Directory, staged: &[StagedCredit]) -> Result<()> {
    for s in staged {
        match directory.users.get(&s.volunteer_id) {
            Some(user) if user.role == Role::Volunteer => {}
            _ => {
                return Err(StorageError::NotFound {
                    entity: "Volunteer",
                    id: s.volunteer_id,
                });
            }
        }
    }
    Ok(())
}

/// Commit a batch of postings. Either every posting lands or none does.
pub(crate) fn commit_batch(
    directory: &mut Directory,
    config: &EngineConfig,
    staged: &[StagedCredit],
    activity_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<Vec<CreditAdjustment>> {
    ensure_volunteers(directory, staged)?;

    Ok(staged
        .iter()
        .map(|s| post(directory, config, *s, activity_id, None, now))
        .collect())
}

// Callers must have checked the volunteer exists.
fn post(
    directory: &mut Directory,
    config: &EngineConfig,
    staged: StagedCredit,
    activity_id: Option<Uuid>,
    note: Option<String>,
    now: DateTime<Utc>,
) -> CreditAdjustment {
    let previous_score = directory
        .users
        .get(&staged.volunteer_id)
        .map(|u| u.credit_score)
        .unwrap_or_default();
    let credit_score = config.clamp_score(previous_score, staged.delta);

    if let Some(user) = directory.users.get_mut(&staged.volunteer_id) {
        user.credit_score = credit_score;
    }
    directory.credit_log.push(CreditEntry {
        volunteer_id: staged.volunteer_id,
        delta: credit_score - previous_score,
        reason: staged.reason,
        score_after: credit_score,
        activity_id,
        note,
        recorded_at: now,
    });

    let adjustment = CreditAdjustment {
        volunteer_id: staged.volunteer_id,
        reason: staged.reason,
        previous_score,
        credit_score,
        previous_tier: config.tier_for(previous_score),
        tier: config.tier_for(credit_score),
    };

    if adjustment.notification().is_some() {
        tracing::warn!(
            volunteer_id = %staged.volunteer_id,
            previous_score,
            credit_score,
            tier = ?adjustment.tier,
            "Volunteer crossed the blacklist threshold"
        );
    } else {
        tracing::debug!(
            volunteer_id = %staged.volunteer_id,
            delta = staged.delta,
            credit_score,
            reason = ?staged.reason,
            "Credit posted"
        );
    }

    adjustment
}
