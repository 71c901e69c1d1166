use chrono::Utc;
use uuid::Uuid;
use volunteer_storage::{
    error::Result,
    models::Eligibility,
    services::eligibility::{RegistrationService, Withdrawal},
};

use crate::state::AppState;

pub fn check_eligibility(state: &AppState, volunteer_id: Uuid, activity_id: Uuid) -> Result<Eligibility> {
    RegistrationService::new(state.db.store(), &state.engine).can_register(
        volunteer_id,
        activity_id,
        Utc::now(),
    )
}

pub fn register(state: &AppState, volunteer_id: Uuid, activity_id: Uuid) -> Result<Eligibility> {
    RegistrationService::new(state.db.store(), &state.engine).register(
        volunteer_id,
        activity_id,
        Utc::now(),
    )
}

/// Withdraw a registration, dispatching the blacklist notice a late-cancel penalty may cause
pub fn unregister(state: &AppState, volunteer_id: Uuid, activity_id: Uuid) -> Result<Withdrawal> {
    let outcome = RegistrationService::new(state.db.store(), &state.engine).unregister(
        volunteer_id,
        activity_id,
        Utc::now(),
    )?;

    if let Withdrawal::Withdrawn {
        penalty: Some(penalty),
        ..
    } = &outcome
    {
        state.notify_all(penalty.notification());
    }

    Ok(outcome)
}
