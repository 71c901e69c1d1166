use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use uuid::Uuid;
use validator::Validate;
use volunteer_storage::{
    dto::{
        activity::ActivityResponse,
        conflict::{ConflictResponse, VolunteerConflictsRequest},
        volunteer::{CreditAdjustmentRequest, CreditOverrideRequest, VolunteerResponse},
    },
    models::CreditEntry,
    repository::user::UserRepository,
    services::credit_ledger::CreditAdjustment,
};

use crate::{error::WebError, middleware::current_user::CurrentUser, state::AppState};

use super::services;

#[utoipa::path(
    get,
    path = "/api/volunteers",
    responses(
        (status = 200, description = "List all volunteers with their tiers", body = Vec<VolunteerResponse>)
    ),
    tag = "volunteers"
)]
pub async fn list_volunteers(State(state): State<AppState>) -> Result<Response, WebError> {
    Ok(Json(services::list_volunteers(&state)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/volunteers/{id}",
    params(
        ("id" = Uuid, Path, description = "Volunteer ID")
    ),
    responses(
        (status = 200, description = "Volunteer found", body = VolunteerResponse),
        (status = 404, description = "Volunteer not found")
    ),
    tag = "volunteers"
)]
pub async fn get_volunteer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    Ok(Json(services::get_volunteer(&state, id)?).into_response())
}

#[utoipa::path(
    get,
    path = "/api/volunteers/{id}/credit",
    params(
        ("id" = Uuid, Path, description = "Volunteer ID")
    ),
    responses(
        (status = 200, description = "Credit history, oldest first", body = Vec<CreditEntry>),
        (status = 404, description = "Volunteer not found")
    ),
    tag = "volunteers"
)]
pub async fn credit_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let history = UserRepository::new(state.db.store()).credit_history(id)?;

    Ok(Json(history).into_response())
}

#[utoipa::path(
    post,
    path = "/api/volunteers/{id}/credit",
    params(
        ("id" = Uuid, Path, description = "Volunteer ID")
    ),
    request_body = CreditAdjustmentRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Credit adjusted", body = CreditAdjustment),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Volunteer not found")
    ),
    tag = "volunteers"
)]
pub async fn adjust_credit(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CreditAdjustmentRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let adjustment = services::adjust_credit(&state, id, &req, &actor)?;

    Ok(Json(adjustment).into_response())
}

#[utoipa::path(
    put,
    path = "/api/volunteers/{id}/credit",
    params(
        ("id" = Uuid, Path, description = "Volunteer ID")
    ),
    request_body = CreditOverrideRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Credit score overridden", body = CreditAdjustment),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Volunteer not found")
    ),
    tag = "volunteers"
)]
pub async fn override_credit(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CreditOverrideRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let adjustment = services::override_credit(&state, id, req.credit_score, &actor)?;

    Ok(Json(adjustment).into_response())
}

#[utoipa::path(
    get,
    path = "/api/volunteers/{id}/activities",
    params(
        ("id" = Uuid, Path, description = "Volunteer ID")
    ),
    responses(
        (status = 200, description = "Activities the volunteer is registered for", body = Vec<ActivityResponse>),
        (status = 404, description = "Volunteer not found")
    ),
    tag = "volunteers"
)]
pub async fn registered_activities(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    Ok(Json(services::registered_activities(&state, id)?).into_response())
}

#[utoipa::path(
    post,
    path = "/api/volunteers/{id}/conflicts",
    params(
        ("id" = Uuid, Path, description = "Volunteer ID")
    ),
    request_body = VolunteerConflictsRequest,
    responses(
        (status = 200, description = "Time conflicts across the volunteer's commitments", body = ConflictResponse),
        (status = 404, description = "Volunteer or candidate activity not found")
    ),
    tag = "volunteers"
)]
pub async fn volunteer_conflicts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<VolunteerConflictsRequest>,
) -> Result<Response, WebError> {
    let conflicts = services::volunteer_conflicts(
        &state,
        id,
        &req.external_events,
        req.candidate_activity_id,
    )?;

    Ok(Json(ConflictResponse { conflicts }).into_response())
}
