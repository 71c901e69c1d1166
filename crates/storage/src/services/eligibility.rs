use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{Result, StorageError};
use crate::models::{
    Activity, ActivityStatus, CreditReason, CreditTier, DenialReason, Eligibility, User,
};
use crate::repository::Store;
use crate::repository::activity::ActivityRepository;
use crate::repository::user::UserRepository;
use crate::services::credit_ledger::{self, CreditAdjustment, StagedCredit};

/// Decide whether `volunteer` may join `activity` at `now`.
///
/// Checks run in a fixed order and the first failure wins.
pub fn check_registration(
    volunteer: &User,
    activity: &Activity,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Eligibility {
    if activity.status != ActivityStatus::Approved {
        return Eligibility::Denied(DenialReason::NotOpen);
    }
    if now > activity.registration_deadline {
        return Eligibility::Denied(DenialReason::DeadlinePassed);
    }
    if activity.is_registered(volunteer.user_id) {
        return Eligibility::Denied(DenialReason::AlreadyRegistered);
    }
    if config.tier_for(volunteer.credit_score) == CreditTier::Blacklisted {
        return Eligibility::Denied(DenialReason::Blacklisted);
    }
    if activity.is_full() {
        return Eligibility::Denied(DenialReason::Full);
    }
    Eligibility::Eligible
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Withdrawal {
    /// The membership was removed. `penalty` is set for late cancellations.
    Withdrawn {
        late: bool,
        penalty: Option<CreditAdjustment>,
    },
    Denied { reason: DenialReason },
}

/// Registration and self-cancellation against the authoritative activity records.
pub struct RegistrationService<'a> {
    store: &'a Store,
    config: &'a EngineConfig,
}

impl<'a> RegistrationService<'a> {
    pub fn new(store: &'a Store, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    /// Advisory check with no side effects.
    pub fn can_register(
        &self,
        volunteer_id: Uuid,
        activity_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Eligibility> {
        let volunteer = self.volunteer(volunteer_id)?;
        let activity = ActivityRepository::new(self.store).find_by_id(activity_id)?;
        Ok(check_registration(&volunteer, &activity, now, self.config))
    }

    /// Join an activity. Eligibility is re-evaluated under the activity lock so two callers
    /// racing for the last seat cannot both succeed.
    pub fn register(
        &self,
        volunteer_id: Uuid,
        activity_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Eligibility> {
        let handle = ActivityRepository::new(self.store).handle(activity_id)?;
        let mut activity = handle.lock();
        let volunteer = self.volunteer(volunteer_id)?;

        let decision = check_registration(&volunteer, &activity, now, self.config);
        match decision {
            Eligibility::Eligible => {
                activity.participants.insert(volunteer_id);
                activity.updated_at = now;
                tracing::info!(
                    %activity_id,
                    %volunteer_id,
                    participants = activity.participant_count(),
                    max = activity.max_participants,
                    "Volunteer registered"
                );
            }
            Eligibility::Denied(reason) => {
                tracing::warn!(%activity_id, %volunteer_id, %reason, "Registration denied");
            }
        }

        Ok(decision)
    }

    /// Leave an activity. Inside the cancel window the late-cancel penalty is posted in the
    /// same critical section as the membership removal.
    pub fn unregister(
        &self,
        volunteer_id: Uuid,
        activity_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Withdrawal> {
        let handle = ActivityRepository::new(self.store).handle(activity_id)?;
        let mut activity = handle.lock();

        let late = now >= activity.cancel_cutoff(self.config.cancel_deadline_hours);
        let denial = if activity.status != ActivityStatus::Approved {
            Some(DenialReason::NotOpen)
        } else if !activity.is_registered(volunteer_id) {
            Some(DenialReason::NotRegistered)
        } else if now >= activity.start_time || (late && !self.config.allow_late_cancel) {
            Some(DenialReason::PastCancelDeadline)
        } else {
            None
        };

        if let Some(reason) = denial {
            tracing::warn!(%activity_id, %volunteer_id, %reason, "Cancellation denied");
            return Ok(Withdrawal::Denied { reason });
        }

        let penalty = if late {
            let mut directory = self.store.directory.write();
            let staged = [StagedCredit {
                volunteer_id,
                delta: -self.config.late_cancel_penalty,
                reason: CreditReason::LateCancel,
            }];
            credit_ledger::commit_batch(
                &mut directory,
                self.config,
                &staged,
                Some(activity_id),
                now,
            )?
            .pop()
        } else {
            None
        };

        activity.participants.remove(&volunteer_id);
        activity.updated_at = now;
        tracing::info!(%activity_id, %volunteer_id, late, "Volunteer unregistered");

        Ok(Withdrawal::Withdrawn { late, penalty })
    }

    fn volunteer(&self, volunteer_id: Uuid) -> Result<User> {
        let user = UserRepository::new(self.store).find_by_id(volunteer_id)?;
        if !user.is_volunteer() {
            return Err(StorageError::Forbidden(format!(
                "user {volunteer_id} is a {} and cannot register for activities",
                user.role
            )));
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::models::Role;
    use crate::services::credit_ledger::CreditLedger;
    use crate::test_support::{add_user, approved_activity, base_time, insert};

    #[test]
    fn test_last_seat_goes_to_first_registrant() {
        let store = Store::new();
        let config = EngineConfig::default();
        let a = add_user(&store, Role::Volunteer, 50);
        let b = add_user(&store, Role::Volunteer, 50);
        let activity = insert(&store, approved_activity(base_time(), 1));

        let service = RegistrationService::new(&store, &config);
        assert_eq!(
            service.register(a.user_id, activity.activity_id, base_time()).unwrap(),
            Eligibility::Eligible
        );
        assert_eq!(
            service.register(b.user_id, activity.activity_id, base_time()).unwrap(),
            Eligibility::Denied(DenialReason::Full)
        );
    }

    #[test]
    fn test_blacklisted_volunteer_is_denied() {
        let store = Store::new();
        let config = EngineConfig::default();
        let volunteer = add_user(&store, Role::Volunteer, 0);
        let activity = insert(&store, approved_activity(base_time(), 3));

        let service = RegistrationService::new(&store, &config);
        assert_eq!(
            service
                .can_register(volunteer.user_id, activity.activity_id, base_time())
                .unwrap(),
            Eligibility::Denied(DenialReason::Blacklisted)
        );
    }

    #[test]
    fn test_check_order() {
        let config = EngineConfig::default();
        let now = base_time();
        let mut volunteer = User {
            user_id: Uuid::new_v4(),
            name: "Ada".to_string(),
            role: Role::Volunteer,
            credit_score: 0,
            service_hours: Default::default(),
            created_at: now,
        };
        let mut activity = approved_activity(now, 1);
        activity.participants.insert(Uuid::new_v4());

        // Full, blacklisted and past the deadline: the deadline is reported first.
        let late = activity.registration_deadline + Duration::minutes(1);
        assert_eq!(
            check_registration(&volunteer, &activity, late, &config),
            Eligibility::Denied(DenialReason::DeadlinePassed)
        );
        assert_eq!(
            check_registration(&volunteer, &activity, now, &config),
            Eligibility::Denied(DenialReason::Blacklisted)
        );

        volunteer.credit_score = 50;
        assert_eq!(
            check_registration(&volunteer, &activity, now, &config),
            Eligibility::Denied(DenialReason::Full)
        );

        activity.participants.insert(volunteer.user_id);
        assert_eq!(
            check_registration(&volunteer, &activity, now, &config),
            Eligibility::Denied(DenialReason::AlreadyRegistered)
        );

        activity.status = ActivityStatus::Pending;
        assert_eq!(
            check_registration(&volunteer, &activity, late, &config),
            Eligibility::Denied(DenialReason::NotOpen)
        );
    }

    #[test]
    fn test_deadline_is_inclusive() {
        let config = EngineConfig::default();
        let activity = approved_activity(base_time(), 2);
        let volunteer = User {
            user_id: Uuid::new_v4(),
            name: "Bo".to_string(),
            role: Role::Volunteer,
            credit_score: 40,
            service_hours: Default::default(),
            created_at: base_time(),
        };

        assert!(
            check_registration(&volunteer, &activity, activity.registration_deadline, &config)
                .is_eligible()
        );
    }

    #[test]
    fn test_can_register_has_no_side_effects() {
        let store = Store::new();
        let config = EngineConfig::default();
        let volunteer = add_user(&store, Role::Volunteer, 50);
        let activity = insert(&store, approved_activity(base_time(), 2));
        let service = RegistrationService::new(&store, &config);

        let first = service
            .can_register(volunteer.user_id, activity.activity_id, base_time())
            .unwrap();
        let second = service
            .can_register(volunteer.user_id, activity.activity_id, base_time())
            .unwrap();

        assert_eq!(first, second);
        assert!(
            ActivityRepository::new(&store)
                .find_by_id(activity.activity_id)
                .unwrap()
                .participants
                .is_empty()
        );
    }

    #[test]
    fn test_register_then_unregister_restores_participants() {
        let store = Store::new();
        let config = EngineConfig::default();
        let existing = add_user(&store, Role::Volunteer, 50);
        let volunteer = add_user(&store, Role::Volunteer, 50);
        let mut activity = approved_activity(base_time(), 4);
        activity.participants.insert(existing.user_id);
        let activity = insert(&store, activity);
        let before = activity.participants.clone();

        let service = RegistrationService::new(&store, &config);
        service
            .register(volunteer.user_id, activity.activity_id, base_time())
            .unwrap();
        let outcome = service
            .unregister(volunteer.user_id, activity.activity_id, base_time())
            .unwrap();

        assert_eq!(
            outcome,
            Withdrawal::Withdrawn {
                late: false,
                penalty: None
            }
        );
        let after = ActivityRepository::new(&store)
            .find_by_id(activity.activity_id)
            .unwrap()
            .participants;
        assert_eq!(after, before);
        assert_eq!(
            CreditLedger::new(&store, &config).score_of(volunteer.user_id).unwrap(),
            50
        );
    }

    #[test]
    fn test_late_cancel_is_penalised() {
        let store = Store::new();
        let config = EngineConfig::default();
        let volunteer = add_user(&store, Role::Volunteer, 50);
        let mut activity = approved_activity(base_time(), 4);
        activity.participants.insert(volunteer.user_id);
        let activity = insert(&store, activity);

        let inside_window = activity.start_time - Duration::hours(2);
        let outcome = RegistrationService::new(&store, &config)
            .unregister(volunteer.user_id, activity.activity_id, inside_window)
            .unwrap();

        match outcome {
            Withdrawal::Withdrawn {
                late: true,
                penalty: Some(penalty),
            } => assert_eq!(penalty.credit_score, 45),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_late_cancel_refused_when_policy_disallows() {
        let store = Store::new();
        let config = EngineConfig {
            allow_late_cancel: false,
            ..EngineConfig::default()
        };
        let volunteer = add_user(&store, Role::Volunteer, 50);
        let mut activity = approved_activity(base_time(), 4);
        activity.participants.insert(volunteer.user_id);
        let activity = insert(&store, activity);

        let service = RegistrationService::new(&store, &config);
        let inside_window = activity.start_time - Duration::hours(2);
        assert_eq!(
            service
                .unregister(volunteer.user_id, activity.activity_id, inside_window)
                .unwrap(),
            Withdrawal::Denied {
                reason: DenialReason::PastCancelDeadline
            }
        );
        assert!(
            ActivityRepository::new(&store)
                .find_by_id(activity.activity_id)
                .unwrap()
                .is_registered(volunteer.user_id)
        );
    }

    #[test]
    fn test_cannot_cancel_after_start_or_without_registration() {
        let store = Store::new();
        let config = EngineConfig::default();
        let volunteer = add_user(&store, Role::Volunteer, 50);
        let stranger = add_user(&store, Role::Volunteer, 50);
        let mut activity = approved_activity(base_time(), 4);
        activity.participants.insert(volunteer.user_id);
        let activity = insert(&store, activity);
        let service = RegistrationService::new(&store, &config);

        assert_eq!(
            service
                .unregister(volunteer.user_id, activity.activity_id, activity.start_time)
                .unwrap(),
            Withdrawal::Denied {
                reason: DenialReason::PastCancelDeadline
            }
        );
        assert_eq!(
            service
                .unregister(stranger.user_id, activity.activity_id, base_time())
                .unwrap(),
            Withdrawal::Denied {
                reason: DenialReason::NotRegistered
            }
        );
    }

    #[test]
    fn test_managers_cannot_register() {
        let store = Store::new();
        let config = EngineConfig::default();
        let manager = add_user(&store, Role::Manager, 50);
        let activity = insert(&store, approved_activity(base_time(), 4));

        let err = RegistrationService::new(&store, &config)
            .register(manager.user_id, activity.activity_id, base_time())
            .unwrap_err();
        assert!(matches!(err, StorageError::Forbidden(_)));
    }

    #[test]
    fn test_racing_registrations_fill_exactly_one_seat() {
        let store = Store::new();
        let config = EngineConfig::default();
        let volunteers: Vec<User> = (0..8)
            .map(|_| add_user(&store, Role::Volunteer, 50))
            .collect();
        let activity = insert(&store, approved_activity(base_time(), 1));

        let results: Vec<Eligibility> = std::thread::scope(|scope| {
            let handles: Vec<_> = volunteers
                .iter()
                .map(|v| {
                    let service = RegistrationService::new(&store, &config);
                    let activity_id = activity.activity_id;
                    let volunteer_id = v.user_id;
                    scope.spawn(move || {
                        service
                            .register(volunteer_id, activity_id, base_time())
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_eligible()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| **r == Eligibility::Denied(DenialReason::Full))
                .count(),
            7
        );
        let stored = ActivityRepository::new(&store)
            .find_by_id(activity.activity_id)
            .unwrap();
        assert_eq!(stored.participant_count(), 1);
    }
}
