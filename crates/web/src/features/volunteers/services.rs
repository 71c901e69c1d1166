use chrono::Utc;
use uuid::Uuid;
use volunteer_storage::{
    dto::{
        activity::ActivityResponse,
        volunteer::{CreditAdjustmentRequest, VolunteerResponse},
    },
    error::{Result, StorageError},
    models::{Actor, Commitment, ConflictPair, CreditReason, Role},
    repository::{activity::ActivityRepository, user::UserRepository},
    services::{
        conflict,
        credit_ledger::{CreditAdjustment, CreditLedger},
    },
};

use crate::state::AppState;

pub fn list_volunteers(state: &AppState) -> Vec<VolunteerResponse> {
    UserRepository::new(state.db.store())
        .list(Some(Role::Volunteer))
        .into_iter()
        .map(|user| VolunteerResponse::new(user, &state.engine))
        .collect()
}

pub fn get_volunteer(state: &AppState, id: Uuid) -> Result<VolunteerResponse> {
    let user = UserRepository::new(state.db.store()).find_volunteer(id)?;
    Ok(VolunteerResponse::new(user, &state.engine))
}

pub fn registered_activities(state: &AppState, id: Uuid) -> Result<Vec<ActivityResponse>> {
    UserRepository::new(state.db.store()).find_volunteer(id)?;

    Ok(ActivityRepository::new(state.db.store())
        .list_for_volunteer(id)
        .into_iter()
        .map(ActivityResponse::from)
        .collect())
}

pub fn adjust_credit(
    state: &AppState,
    id: Uuid,
    request: &CreditAdjustmentRequest,
    actor: &Actor,
) -> Result<CreditAdjustment> {
    ensure_admin(actor)?;

    let adjustment = CreditLedger::new(state.db.store(), &state.engine).adjust_with_note(
        id,
        request.delta,
        CreditReason::Manual,
        Some(format!(
            "{} (by {})",
            request.note.as_deref().unwrap_or("manual adjustment"),
            actor.user_id
        )),
        Utc::now(),
    )?;
    state.notify_all(adjustment.notification());
    Ok(adjustment)
}

pub fn override_credit(
    state: &AppState,
    id: Uuid,
    credit_score: i32,
    actor: &Actor,
) -> Result<CreditAdjustment> {
    ensure_admin(actor)?;

    let adjustment = CreditLedger::new(state.db.store(), &state.engine).override_score(
        id,
        credit_score,
        Utc::now(),
    )?;
    state.notify_all(adjustment.notification());
    Ok(adjustment)
}

pub fn volunteer_conflicts(
    state: &AppState,
    id: Uuid,
    external_events: &[Commitment],
    candidate_activity_id: Option<Uuid>,
) -> Result<Vec<ConflictPair>> {
    conflict::volunteer_conflicts(state.db.store(), id, external_events, candidate_activity_id)
}

fn ensure_admin(actor: &Actor) -> Result<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(StorageError::Forbidden(
            "only administrators can change credit scores".to_string(),
        ))
    }
}
