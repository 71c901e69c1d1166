use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::dto::activity::{CompleteActivityRequest, CreateActivityRequest, UpdateActivityRequest};
use crate::error::{Result, StorageError};
use crate::models::{
    Activity, ActivityStatus, Actor, CreditReason, LifecycleAction, Materials, Notification, Role,
};
use crate::repository::Store;
use crate::repository::activity::ActivityRepository;
use crate::repository::user::UserRepository;
use crate::services::credit_ledger::{self, CreditAdjustment, StagedCredit};

/// What `complete()` did to the activity and to the ledger.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CompletionReport {
    pub activity: Activity,
    pub rewarded: Vec<Uuid>,
    pub no_shows: Vec<Uuid>,
    pub adjustments: Vec<CreditAdjustment>,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CancellationReport {
    pub activity: Activity,
    pub notification: Notification,
}

/// Drives activities through their status transitions and the side effects attached to them.
pub struct ActivityLifecycle<'a> {
    store: &'a Store,
    config: &'a EngineConfig,
}

impl<'a> ActivityLifecycle<'a> {
    pub fn new(store: &'a Store, config: &'a EngineConfig) -> Self {
        Self { store, config }
    }

    fn activities(&self) -> ActivityRepository<'a> {
        ActivityRepository::new(self.store)
    }

    /// Create a pending activity owned by the submitting manager.
    pub fn submit(
        &self,
        actor: &Actor,
        request: &CreateActivityRequest,
        now: DateTime<Utc>,
    ) -> Result<Activity> {
        if actor.role != Role::Manager {
            return Err(StorageError::Forbidden(
                "only activity managers can submit activities".to_string(),
            ));
        }

        let activity = Activity {
            activity_id: Uuid::new_v4(),
            title: request.title.clone(),
            description: request.description.clone(),
            activity_type: request.activity_type,
            location: request.location.clone(),
            manager_id: actor.user_id,
            start_time: request.start_time,
            end_time: request.end_time,
            registration_deadline: request.registration_deadline,
            min_participants: request.min_participants,
            max_participants: request.max_participants,
            participants: BTreeSet::new(),
            status: ActivityStatus::Pending,
            service_hours: None,
            location_changed: false,
            participants_notified: false,
            materials: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        activity
            .validate_schedule()
            .map_err(|e| StorageError::Validation(e.to_string()))?;

        let activity = self.activities().create(activity)?;
        tracing::info!(activity_id = %activity.activity_id, manager_id = %actor.user_id, "Activity submitted");
        Ok(activity)
    }

    /// `pending → approved`, optionally handing the activity to another manager.
    pub fn approve(
        &self,
        actor: &Actor,
        activity_id: Uuid,
        manager_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<Activity> {
        ensure_admin(actor)?;
        if let Some(manager_id) = manager_id {
            let manager = UserRepository::new(self.store).find_by_id(manager_id)?;
            if manager.role != Role::Manager {
                return Err(StorageError::Validation(format!(
                    "user {manager_id} is not an activity manager"
                )));
            }
        }

        let (activity, _) = self.activities().update(activity_id, |activity| {
            activity.status = transition(activity, LifecycleAction::Approve)?;
            if let Some(manager_id) = manager_id {
                activity.manager_id = manager_id;
            }
            activity.updated_at = now;
            Ok(())
        })?;

        tracing::info!(%activity_id, manager_id = %activity.manager_id, "Activity approved");
        Ok(activity)
    }

    /// `pending → rejected`. No credit side effects.
    pub fn reject(
        &self,
        actor: &Actor,
        activity_id: Uuid,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Activity> {
        ensure_admin(actor)?;

        let (activity, _) = self.activities().update(activity_id, |activity| {
            activity.status = transition(activity, LifecycleAction::Reject)?;
            activity.rejection_reason = reason;
            activity.updated_at = now;
            Ok(())
        })?;

        tracing::info!(%activity_id, "Activity rejected");
        Ok(activity)
    }

    /// Patch a pending activity. The patched record must pass the same checks as a submission.
    pub fn edit(
        &self,
        actor: &Actor,
        activity_id: Uuid,
        request: &UpdateActivityRequest,
        now: DateTime<Utc>,
    ) -> Result<Activity> {
        let (activity, _) = self.activities().update(activity_id, |activity| {
            ensure_owner(actor, activity)?;
            transition(activity, LifecycleAction::Edit)?;

            request.apply(activity);
            activity
                .validate_schedule()
                .map_err(|e| StorageError::Validation(e.to_string()))?;
            if activity.participants.len() > activity.max_participants as usize {
                return Err(StorageError::Validation(
                    "Maximum participants cannot drop below current registrations".to_string(),
                ));
            }
            activity.updated_at = now;
            Ok(())
        })?;

        tracing::info!(%activity_id, "Activity edited");
        Ok(activity)
    }

    /// Remove a pending activity together with its registrations.
    pub fn delete(&self, actor: &Actor, activity_id: Uuid) -> Result<Activity> {
        let removed = self.activities().delete(activity_id, |activity| {
            ensure_owner(actor, activity)?;
            transition(activity, LifecycleAction::Delete)?;
            Ok(())
        })?;

        tracing::info!(
            %activity_id,
            registrations = removed.participant_count(),
            "Activity deleted"
        );
        Ok(removed)
    }

    /// `approved → cancelled` before the activity starts. Participants are owed a notice but
    /// lose no credit.
    pub fn cancel(
        &self,
        actor: &Actor,
        activity_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<CancellationReport> {
        let (activity, _) = self.activities().update(activity_id, |activity| {
            ensure_admin_or_owner(actor, activity)?;
            let next = transition(activity, LifecycleAction::Cancel)?;
            if now >= activity.start_time {
                return Err(StorageError::Validation(
                    "Activity has already started and can no longer be cancelled".to_string(),
                ));
            }
            activity.status = next;
            activity.updated_at = now;
            Ok(())
        })?;

        let notification = Notification::ActivityCancelled {
            activity_id,
            title: activity.title.clone(),
            recipients: activity.participants.iter().copied().collect(),
        };
        tracing::info!(
            %activity_id,
            participants = activity.participant_count(),
            "Activity cancelled"
        );

        Ok(CancellationReport {
            activity,
            notification,
        })
    }

    /// `approved → completed`. Present participants earn the completion bonus and service hours,
    /// absent ones take the no-show penalty. Ledger postings and the status change commit
    /// together or not at all.
    pub fn complete(
        &self,
        actor: &Actor,
        activity_id: Uuid,
        request: &CompleteActivityRequest,
        now: DateTime<Utc>,
    ) -> Result<CompletionReport> {
        let handle = self.activities().handle(activity_id)?;
        let mut activity = handle.lock();
        ensure_admin_or_owner(actor, &activity)?;

        self.finish(&mut activity, request.present.as_ref(), request.service_hours, now)
    }

    /// Complete every approved activity whose end time has passed, treating all registrants as
    /// present. Does nothing unless automatic completion is enabled.
    pub fn auto_complete_due(&self, now: DateTime<Utc>) -> Result<Vec<CompletionReport>> {
        if !self.config.auto_complete_activities {
            return Ok(Vec::new());
        }

        let due: Vec<Uuid> = self
            .activities()
            .list()
            .into_iter()
            .filter(|a| a.status == ActivityStatus::Approved && a.end_time <= now)
            .map(|a| a.activity_id)
            .collect();

        let mut reports = Vec::new();
        for activity_id in due {
            let handle = self.activities().handle(activity_id)?;
            let mut activity = handle.lock();
            if activity.status != ActivityStatus::Approved {
                continue;
            }
            if self.config.require_materials_approval && !materials_approved(&activity) {
                tracing::debug!(%activity_id, "Skipping auto-completion until materials are approved");
                continue;
            }
            match self.finish(&mut activity, None, None, now) {
                Ok(report) => reports.push(report),
                Err(e) => {
                    tracing::error!(
                        %activity_id,
                        error = %e,
                        "Auto-completion failed, leaving activity approved"
                    );
                }
            }
        }

        tracing::info!(completed = reports.len(), "Auto-completion sweep finished");
        Ok(reports)
    }

    fn finish(
        &self,
        activity: &mut Activity,
        present: Option<&BTreeSet<Uuid>>,
        service_hours: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Result<CompletionReport> {
        let next = transition(activity, LifecycleAction::Complete)?;
        if now < activity.end_time {
            return Err(StorageError::Validation(
                "Activity cannot be completed before it ends".to_string(),
            ));
        }
        if self.config.require_materials_approval && !materials_approved(activity) {
            return Err(StorageError::Validation(
                "Completion materials must be approved first".to_string(),
            ));
        }

        let present = match present {
            Some(present) if !present.is_subset(&activity.participants) => {
                return Err(StorageError::Validation(
                    "Attendance lists a volunteer who is not registered".to_string(),
                ));
            }
            Some(present) => present.clone(),
            None => activity.participants.clone(),
        };
        let hours = service_hours.unwrap_or_else(|| activity.scheduled_hours());
        if hours.is_sign_negative() {
            return Err(StorageError::Validation(
                "Service hours cannot be negative".to_string(),
            ));
        }

        let (rewarded, no_shows): (Vec<Uuid>, Vec<Uuid>) = activity
            .participants
            .iter()
            .copied()
            .partition(|id| present.contains(id));
        let staged: Vec<StagedCredit> = rewarded
            .iter()
            .map(|id| StagedCredit {
                volunteer_id: *id,
                delta: self.config.activity_completion_bonus,
                reason: CreditReason::ActivityCompleted,
            })
            .chain(no_shows.iter().map(|id| StagedCredit {
                volunteer_id: *id,
                delta: -self.config.no_show_penalty,
                reason: CreditReason::NoShow,
            }))
            .collect();

        // Everything fallible has been checked; from here on the batch commits in one piece.
        let adjustments = {
            let mut directory = self.store.directory.write();
            let adjustments = credit_ledger::commit_batch(
                &mut directory,
                self.config,
                &staged,
                Some(activity.activity_id),
                now,
            )?;
            for id in &rewarded {
                if let Some(user) = directory.users.get_mut(id) {
                    user.service_hours += hours;
                }
            }
            adjustments
        };

        activity.status = next;
        activity.service_hours = Some(hours);
        activity.completed_at = Some(now);
        activity.updated_at = now;

        let notifications = adjustments.iter().filter_map(|a| a.notification()).collect();
        tracing::info!(
            activity_id = %activity.activity_id,
            rewarded = rewarded.len(),
            no_shows = no_shows.len(),
            %hours,
            "Activity completed"
        );

        Ok(CompletionReport {
            activity: activity.clone(),
            rewarded,
            no_shows,
            adjustments,
            notifications,
        })
    }

    /// Attach proof-of-completion files. Replaces any earlier, unapproved submission.
    pub fn submit_materials(
        &self,
        actor: &Actor,
        activity_id: Uuid,
        files: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<Activity> {
        let (activity, _) = self.activities().update(activity_id, |activity| {
            ensure_owner(actor, activity)?;
            transition(activity, LifecycleAction::SubmitMaterials)?;
            if now < activity.end_time {
                return Err(StorageError::Validation(
                    "Materials can only be submitted after the activity ends".to_string(),
                ));
            }
            if materials_approved(activity) {
                return Err(StorageError::ConstraintViolation(
                    "Materials have already been approved".to_string(),
                ));
            }
            activity.materials = Some(Materials::new(files, now));
            activity.updated_at = now;
            Ok(())
        })?;

        tracing::info!(%activity_id, "Completion materials submitted");
        Ok(activity)
    }

    pub fn review_materials(
        &self,
        actor: &Actor,
        activity_id: Uuid,
        approved: bool,
        rejection_reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Activity> {
        ensure_admin(actor)?;

        let (activity, _) = self.activities().update(activity_id, |activity| {
            transition(activity, LifecycleAction::ReviewMaterials)?;
            let materials = activity.materials.as_mut().ok_or_else(|| {
                StorageError::Validation("No materials have been submitted".to_string())
            })?;
            materials.approved = approved;
            materials.rejected = !approved;
            materials.rejection_reason = if approved { None } else { rejection_reason };
            materials.reviewed_at = Some(now);
            activity.updated_at = now;
            Ok(())
        })?;

        tracing::info!(%activity_id, approved, "Completion materials reviewed");
        Ok(activity)
    }

    /// Move an approved activity. Participants are flagged as not yet notified.
    pub fn relocate(
        &self,
        actor: &Actor,
        activity_id: Uuid,
        location: String,
        now: DateTime<Utc>,
    ) -> Result<Activity> {
        let (activity, _) = self.activities().update(activity_id, |activity| {
            ensure_owner(actor, activity)?;
            transition(activity, LifecycleAction::Relocate)?;
            if now >= activity.start_time {
                return Err(StorageError::Validation(
                    "Activity has already started".to_string(),
                ));
            }
            if activity.location == location {
                return Ok(());
            }
            activity.location = location;
            activity.location_changed = true;
            activity.participants_notified = false;
            activity.updated_at = now;
            Ok(())
        })?;

        tracing::info!(%activity_id, location = %activity.location, "Activity relocated");
        Ok(activity)
    }

    /// Record that participants were told about a location change and return the notice owed.
    pub fn mark_participants_notified(
        &self,
        actor: &Actor,
        activity_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(Activity, Notification)> {
        ensure_admin(actor)?;

        let (activity, _) = self.activities().update(activity_id, |activity| {
            transition(activity, LifecycleAction::MarkNotified)?;
            if !activity.location_changed {
                return Err(StorageError::Validation(
                    "Activity location has not changed".to_string(),
                ));
            }
            activity.participants_notified = true;
            activity.updated_at = now;
            Ok(())
        })?;

        let notification = Notification::LocationChanged {
            activity_id,
            location: activity.location.clone(),
            recipients: activity.participants.iter().copied().collect(),
        };
        Ok((activity, notification))
    }
}

fn transition(activity: &Activity, action: LifecycleAction) -> Result<ActivityStatus> {
    activity.status.next(action).ok_or_else(|| {
        tracing::warn!(
            activity_id = %activity.activity_id,
            status = %activity.status,
            %action,
            "Rejected invalid lifecycle transition"
        );
        StorageError::InvalidTransition {
            from: activity.status,
            action,
        }
    })
}

fn materials_approved(activity: &Activity) -> bool {
    activity.materials.as_ref().is_some_and(|m| m.approved)
}

fn ensure_admin(actor: &Actor) -> Result<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(StorageError::Forbidden("administrator role required".to_string()))
    }
}

fn ensure_owner(actor: &Actor, activity: &Activity) -> Result<()> {
    if actor.role == Role::Manager && actor.user_id == activity.manager_id {
        Ok(())
    } else {
        Err(StorageError::Forbidden(
            "only the owning manager may do this".to_string(),
        ))
    }
}

fn ensure_admin_or_owner(actor: &Actor, activity: &Activity) -> Result<()> {
    if actor.is_admin() {
        return Ok(());
    }
    ensure_owner(actor, activity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::models::{ActivityType, CreditTier, User};
    use crate::services::credit_ledger::CreditLedger;
    use crate::test_support::{actor, add_user, approved_activity, base_time, insert};

    struct Fixture {
        store: Store,
        config: EngineConfig,
        admin: User,
        manager: User,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_config(EngineConfig::default())
        }

        fn with_config(config: EngineConfig) -> Self {
            let store = Store::new();
            let admin = add_user(&store, Role::Admin, 0);
            let manager = add_user(&store, Role::Manager, 0);
            Self {
                store,
                config,
                admin,
                manager,
            }
        }

        fn lifecycle(&self) -> ActivityLifecycle<'_> {
            ActivityLifecycle::new(&self.store, &self.config)
        }

        fn owned_activity(&self, status: ActivityStatus) -> Activity {
            let mut activity = approved_activity(base_time(), 5);
            activity.manager_id = self.manager.user_id;
            activity.status = status;
            insert(&self.store, activity)
        }

        fn stored(&self, id: Uuid) -> Activity {
            ActivityRepository::new(&self.store).find_by_id(id).unwrap()
        }
    }

    fn create_request(now: DateTime<Utc>) -> CreateActivityRequest {
        let start = now + Duration::days(10);
        CreateActivityRequest {
            title: "Blood drive helpers".to_string(),
            description: "Guide donors between stations".to_string(),
            activity_type: ActivityType::Healthcare,
            location: "Student centre".to_string(),
            start_time: start,
            end_time: start + Duration::hours(3),
            registration_deadline: start - Duration::days(2),
            min_participants: 4,
            max_participants: 12,
        }
    }

    #[test]
    fn test_submit_creates_pending_activity() {
        let fx = Fixture::new();
        let activity = fx
            .lifecycle()
            .submit(&actor(&fx.manager), &create_request(base_time()), base_time())
            .unwrap();

        assert_eq!(activity.status, ActivityStatus::Pending);
        assert_eq!(activity.manager_id, fx.manager.user_id);
        assert_eq!(fx.stored(activity.activity_id), activity);
    }

    #[test]
    fn test_submit_rejects_bad_schedule() {
        let fx = Fixture::new();
        let mut request = create_request(base_time());
        request.end_time = request.start_time;

        let err = fx
            .lifecycle()
            .submit(&actor(&fx.manager), &request, base_time())
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));

        let mut request = create_request(base_time());
        request.min_participants = 20;
        let err = fx
            .lifecycle()
            .submit(&actor(&fx.manager), &request, base_time())
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
        assert!(ActivityRepository::new(&fx.store).list().is_empty());
    }

    #[test]
    fn test_only_managers_submit() {
        let fx = Fixture::new();
        let err = fx
            .lifecycle()
            .submit(&actor(&fx.admin), &create_request(base_time()), base_time())
            .unwrap_err();
        assert!(matches!(err, StorageError::Forbidden(_)));
    }

    #[test]
    fn test_approve_with_reassignment() {
        let fx = Fixture::new();
        let other = add_user(&fx.store, Role::Manager, 0);
        let activity = fx.owned_activity(ActivityStatus::Pending);

        let approved = fx
            .lifecycle()
            .approve(
                &actor(&fx.admin),
                activity.activity_id,
                Some(other.user_id),
                base_time(),
            )
            .unwrap();

        assert_eq!(approved.status, ActivityStatus::Approved);
        assert_eq!(approved.manager_id, other.user_id);
    }

    #[test]
    fn test_approve_requires_admin() {
        let fx = Fixture::new();
        let activity = fx.owned_activity(ActivityStatus::Pending);

        let err = fx
            .lifecycle()
            .approve(&actor(&fx.manager), activity.activity_id, None, base_time())
            .unwrap_err();
        assert!(matches!(err, StorageError::Forbidden(_)));
        assert_eq!(fx.stored(activity.activity_id).status, ActivityStatus::Pending);
    }

    #[test]
    fn test_reject_twice_fails_without_mutation() {
        let fx = Fixture::new();
        let activity = fx.owned_activity(ActivityStatus::Pending);
        let lifecycle = fx.lifecycle();

        let rejected = lifecycle
            .reject(
                &actor(&fx.admin),
                activity.activity_id,
                Some("Venue unavailable".to_string()),
                base_time(),
            )
            .unwrap();

        let err = lifecycle
            .reject(
                &actor(&fx.admin),
                activity.activity_id,
                Some("again".to_string()),
                base_time() + Duration::hours(1),
            )
            .unwrap_err();

        assert!(err.is_invalid_transition());
        assert_eq!(fx.stored(activity.activity_id), rejected);
    }

    #[test]
    fn test_approve_completed_activity_is_invalid() {
        let fx = Fixture::new();
        let activity = fx.owned_activity(ActivityStatus::Completed);

        let err = fx
            .lifecycle()
            .approve(&actor(&fx.admin), activity.activity_id, None, base_time())
            .unwrap_err();

        assert!(matches!(
            err,
            StorageError::InvalidTransition {
                from: ActivityStatus::Completed,
                action: LifecycleAction::Approve
            }
        ));
    }

    #[test]
    fn test_edit_only_while_pending() {
        let fx = Fixture::new();
        let pending = fx.owned_activity(ActivityStatus::Pending);
        let approved = fx.owned_activity(ActivityStatus::Approved);
        let request = UpdateActivityRequest {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };

        let edited = fx
            .lifecycle()
            .edit(&actor(&fx.manager), pending.activity_id, &request, base_time())
            .unwrap();
        assert_eq!(edited.title, "Renamed");

        let err = fx
            .lifecycle()
            .edit(&actor(&fx.manager), approved.activity_id, &request, base_time())
            .unwrap_err();
        assert!(err.is_invalid_transition());
    }

    #[test]
    fn test_invalid_edit_leaves_activity_unchanged() {
        let fx = Fixture::new();
        let pending = fx.owned_activity(ActivityStatus::Pending);
        let request = UpdateActivityRequest {
            title: Some("Renamed".to_string()),
            end_time: Some(pending.start_time - Duration::hours(1)),
            ..Default::default()
        };

        let err = fx
            .lifecycle()
            .edit(&actor(&fx.manager), pending.activity_id, &request, base_time())
            .unwrap_err();

        assert!(matches!(err, StorageError::Validation(_)));
        assert_eq!(fx.stored(pending.activity_id), pending);
    }

    #[test]
    fn test_edit_by_other_manager_is_forbidden() {
        let fx = Fixture::new();
        let other = add_user(&fx.store, Role::Manager, 0);
        let pending = fx.owned_activity(ActivityStatus::Pending);

        let err = fx
            .lifecycle()
            .edit(
                &actor(&other),
                pending.activity_id,
                &UpdateActivityRequest::default(),
                base_time(),
            )
            .unwrap_err();
        assert!(matches!(err, StorageError::Forbidden(_)));
    }

    #[test]
    fn test_delete_pending_only() {
        let fx = Fixture::new();
        let pending = fx.owned_activity(ActivityStatus::Pending);
        let approved = fx.owned_activity(ActivityStatus::Approved);

        fx.lifecycle()
            .delete(&actor(&fx.manager), pending.activity_id)
            .unwrap();
        assert!(
            ActivityRepository::new(&fx.store)
                .find_by_id(pending.activity_id)
                .unwrap_err()
                .is_not_found()
        );

        let err = fx
            .lifecycle()
            .delete(&actor(&fx.manager), approved.activity_id)
            .unwrap_err();
        assert!(err.is_invalid_transition());
        assert_eq!(fx.stored(approved.activity_id), approved);
    }

    #[test]
    fn test_cancel_notifies_without_penalty() {
        let fx = Fixture::new();
        let volunteer = add_user(&fx.store, Role::Volunteer, 50);
        let mut activity = approved_activity(base_time(), 5);
        activity.manager_id = fx.manager.user_id;
        activity.participants.insert(volunteer.user_id);
        let activity = insert(&fx.store, activity);

        let report = fx
            .lifecycle()
            .cancel(&actor(&fx.manager), activity.activity_id, base_time())
            .unwrap();

        assert_eq!(report.activity.status, ActivityStatus::Cancelled);
        assert_eq!(
            report.notification,
            Notification::ActivityCancelled {
                activity_id: activity.activity_id,
                title: activity.title.clone(),
                recipients: vec![volunteer.user_id],
            }
        );
        assert_eq!(
            CreditLedger::new(&fx.store, &fx.config)
                .score_of(volunteer.user_id)
                .unwrap(),
            50
        );
    }

    #[test]
    fn test_cancel_after_start_is_refused() {
        let fx = Fixture::new();
        let activity = fx.owned_activity(ActivityStatus::Approved);

        let err = fx
            .lifecycle()
            .cancel(&actor(&fx.admin), activity.activity_id, activity.start_time)
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
        assert_eq!(fx.stored(activity.activity_id).status, ActivityStatus::Approved);
    }

    fn finished_activity(fx: &Fixture, participants: &[Uuid]) -> Activity {
        let mut activity = approved_activity(base_time(), 5);
        activity.manager_id = fx.manager.user_id;
        activity.participants.extend(participants.iter().copied());
        insert(&fx.store, activity)
    }

    #[test]
    fn test_complete_requires_end_time_and_materials() {
        let fx = Fixture::new();
        let activity = finished_activity(&fx, &[]);
        let lifecycle = fx.lifecycle();
        let request = CompleteActivityRequest::default();

        let err = lifecycle
            .complete(&actor(&fx.admin), activity.activity_id, &request, base_time())
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));

        let after_end = activity.end_time + Duration::hours(1);
        let err = lifecycle
            .complete(&actor(&fx.admin), activity.activity_id, &request, after_end)
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
        assert_eq!(fx.stored(activity.activity_id).status, ActivityStatus::Approved);
    }

    #[test]
    fn test_complete_rewards_and_penalises() {
        let fx = Fixture::new();
        let present = add_user(&fx.store, Role::Volunteer, 79);
        let absent = add_user(&fx.store, Role::Volunteer, 8);
        let activity = finished_activity(&fx, &[present.user_id, absent.user_id]);
        let lifecycle = fx.lifecycle();
        let after_end = activity.end_time + Duration::hours(1);

        lifecycle
            .submit_materials(
                &actor(&fx.manager),
                activity.activity_id,
                vec!["sign-in-sheet.pdf".to_string()],
                after_end,
            )
            .unwrap();
        lifecycle
            .review_materials(&actor(&fx.admin), activity.activity_id, true, None, after_end)
            .unwrap();

        let request = CompleteActivityRequest {
            present: Some(BTreeSet::from([present.user_id])),
            service_hours: None,
        };
        let report = lifecycle
            .complete(&actor(&fx.manager), activity.activity_id, &request, after_end)
            .unwrap();

        assert_eq!(report.activity.status, ActivityStatus::Completed);
        assert_eq!(report.activity.service_hours, Some(Decimal::from(2)));
        assert_eq!(report.rewarded, vec![present.user_id]);
        assert_eq!(report.no_shows, vec![absent.user_id]);
        assert!(matches!(
            report.notifications.as_slice(),
            [Notification::BlacklistEntered { credit_score: 0, .. }]
        ));

        let ledger = CreditLedger::new(&fx.store, &fx.config);
        assert_eq!(ledger.score_of(present.user_id).unwrap(), 81);
        assert_eq!(ledger.tier_of(present.user_id).unwrap(), CreditTier::Excellent);
        assert_eq!(ledger.score_of(absent.user_id).unwrap(), 0);

        let users = UserRepository::new(&fx.store);
        assert_eq!(users.find_by_id(present.user_id).unwrap().service_hours, Decimal::from(2));
        assert_eq!(users.find_by_id(absent.user_id).unwrap().service_hours, Decimal::ZERO);

        let err = lifecycle
            .complete(&actor(&fx.admin), activity.activity_id, &request, after_end)
            .unwrap_err();
        assert!(err.is_invalid_transition());
    }

    #[test]
    fn test_complete_is_atomic_when_a_participant_is_unknown() {
        let fx = Fixture::with_config(EngineConfig {
            require_materials_approval: false,
            ..EngineConfig::default()
        });
        let known = add_user(&fx.store, Role::Volunteer, 50);
        let activity = finished_activity(&fx, &[known.user_id, Uuid::new_v4()]);
        let after_end = activity.end_time + Duration::minutes(5);

        let err = fx
            .lifecycle()
            .complete(
                &actor(&fx.admin),
                activity.activity_id,
                &CompleteActivityRequest::default(),
                after_end,
            )
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(fx.stored(activity.activity_id), activity);
        assert_eq!(
            CreditLedger::new(&fx.store, &fx.config)
                .score_of(known.user_id)
                .unwrap(),
            50
        );
        assert!(
            UserRepository::new(&fx.store)
                .credit_history(known.user_id)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_attendance_must_be_registered() {
        let fx = Fixture::with_config(EngineConfig {
            require_materials_approval: false,
            ..EngineConfig::default()
        });
        let activity = finished_activity(&fx, &[]);
        let request = CompleteActivityRequest {
            present: Some(BTreeSet::from([Uuid::new_v4()])),
            service_hours: None,
        };

        let err = fx
            .lifecycle()
            .complete(
                &actor(&fx.admin),
                activity.activity_id,
                &request,
                activity.end_time,
            )
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
    }

    #[test]
    fn test_auto_complete_sweep() {
        let fx = Fixture::with_config(EngineConfig {
            auto_complete_activities: true,
            require_materials_approval: false,
            ..EngineConfig::default()
        });
        let volunteer = add_user(&fx.store, Role::Volunteer, 50);
        let due = finished_activity(&fx, &[volunteer.user_id]);
        let later = {
            let mut a = approved_activity(base_time() + Duration::days(30), 5);
            a.manager_id = fx.manager.user_id;
            insert(&fx.store, a)
        };

        let reports = fx
            .lifecycle()
            .auto_complete_due(due.end_time + Duration::hours(1))
            .unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].activity.activity_id, due.activity_id);
        assert_eq!(reports[0].rewarded, vec![volunteer.user_id]);
        assert_eq!(fx.stored(later.activity_id).status, ActivityStatus::Approved);
    }

    #[test]
    fn test_auto_complete_skips_activity_that_fails_to_commit() {
        let fx = Fixture::with_config(EngineConfig {
            auto_complete_activities: true,
            require_materials_approval: false,
            ..EngineConfig::default()
        });
        let volunteer = add_user(&fx.store, Role::Volunteer, 50);
        let healthy = finished_activity(&fx, &[volunteer.user_id]);
        let broken = finished_activity(&fx, &[Uuid::new_v4()]);

        let reports = fx
            .lifecycle()
            .auto_complete_due(healthy.end_time + Duration::hours(1))
            .unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].activity.activity_id, healthy.activity_id);
        assert_eq!(fx.stored(broken.activity_id).status, ActivityStatus::Approved);
    }

    #[test]
    fn test_auto_complete_disabled_by_default() {
        let fx = Fixture::new();
        let due = finished_activity(&fx, &[]);

        let reports = fx
            .lifecycle()
            .auto_complete_due(due.end_time + Duration::days(1))
            .unwrap();
        assert!(reports.is_empty());
        assert_eq!(fx.stored(due.activity_id).status, ActivityStatus::Approved);
    }

    #[test]
    fn test_relocate_and_mark_notified() {
        let fx = Fixture::new();
        let volunteer = add_user(&fx.store, Role::Volunteer, 50);
        let activity = finished_activity(&fx, &[volunteer.user_id]);
        let lifecycle = fx.lifecycle();

        let moved = lifecycle
            .relocate(
                &actor(&fx.manager),
                activity.activity_id,
                "Gym hall B".to_string(),
                base_time(),
            )
            .unwrap();
        assert!(moved.location_changed);
        assert!(!moved.participants_notified);

        let (notified, notification) = lifecycle
            .mark_participants_notified(&actor(&fx.admin), activity.activity_id, base_time())
            .unwrap();
        assert!(notified.participants_notified);
        assert_eq!(
            notification,
            Notification::LocationChanged {
                activity_id: activity.activity_id,
                location: "Gym hall B".to_string(),
                recipients: vec![volunteer.user_id],
            }
        );
    }

    #[test]
    fn test_rejected_materials_block_completion() {
        let fx = Fixture::new();
        let activity = finished_activity(&fx, &[]);
        let lifecycle = fx.lifecycle();
        let after_end = activity.end_time + Duration::hours(1);

        lifecycle
            .submit_materials(
                &actor(&fx.manager),
                activity.activity_id,
                vec!["photo.jpg".to_string()],
                after_end,
            )
            .unwrap();
        let reviewed = lifecycle
            .review_materials(
                &actor(&fx.admin),
                activity.activity_id,
                false,
                Some("Photo is blurry".to_string()),
                after_end,
            )
            .unwrap();

        let materials = reviewed.materials.unwrap();
        assert!(materials.rejected);
        assert_eq!(materials.rejection_reason.as_deref(), Some("Photo is blurry"));

        let err = lifecycle
            .complete(
                &actor(&fx.admin),
                activity.activity_id,
                &CompleteActivityRequest::default(),
                after_end,
            )
            .unwrap_err();
        assert!(matches!(err, StorageError::Validation(_)));
    }
}
