use chrono::Utc;
use uuid::Uuid;
use volunteer_storage::{
    dto::{
        activity::{ActivityFilter, ActivityResponse, CompleteActivityRequest},
        common::{PaginatedResponse, PaginationParams},
    },
    error::Result,
    models::{Activity, Actor},
    repository::activity::ActivityRepository,
    services::lifecycle::{ActivityLifecycle, CompletionReport},
};

use crate::state::AppState;

/// List activities matching the filter, one page at a time
pub fn list_activities(
    state: &AppState,
    filter: &ActivityFilter,
    pagination: &PaginationParams,
) -> PaginatedResponse<ActivityResponse> {
    let activities: Vec<ActivityResponse> = ActivityRepository::new(state.db.store())
        .list()
        .into_iter()
        .filter(|a| filter.matches(a))
        .map(ActivityResponse::from)
        .collect();

    PaginatedResponse::from_items(activities, pagination)
}

/// Cancel an activity and tell its participants
pub fn cancel_activity(state: &AppState, actor: &Actor, id: Uuid) -> Result<Activity> {
    let report = ActivityLifecycle::new(state.db.store(), &state.engine).cancel(actor, id, Utc::now())?;
    state.notifier.dispatch(report.notification);
    Ok(report.activity)
}

/// Complete an activity and dispatch any blacklist notices it caused
pub fn complete_activity(
    state: &AppState,
    actor: &Actor,
    id: Uuid,
    request: &CompleteActivityRequest,
) -> Result<CompletionReport> {
    let report = ActivityLifecycle::new(state.db.store(), &state.engine)
        .complete(actor, id, request, Utc::now())?;
    state.notify_all(report.notifications.iter().cloned());
    Ok(report)
}

/// Run the time-based completion sweep
pub fn auto_complete(state: &AppState) -> Result<Vec<CompletionReport>> {
    let reports =
        ActivityLifecycle::new(state.db.store(), &state.engine).auto_complete_due(Utc::now())?;
    state.notify_all(
        reports
            .iter()
            .flat_map(|r| r.notifications.iter().cloned()),
    );
    Ok(reports)
}

/// Flag a location change as communicated and send the notice
pub fn mark_notified(state: &AppState, actor: &Actor, id: Uuid) -> Result<Activity> {
    let (activity, notification) = ActivityLifecycle::new(state.db.store(), &state.engine)
        .mark_participants_notified(actor, id, Utc::now())?;
    state.notifier.dispatch(notification);
    Ok(activity)
}
