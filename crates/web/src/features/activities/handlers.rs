use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;
use volunteer_storage::{
    dto::{
        activity::{
            ActivityFilter, ActivityResponse, ApproveActivityRequest, CompleteActivityRequest,
            CreateActivityRequest, RejectActivityRequest, RelocateActivityRequest,
            ReviewMaterialsRequest, SubmitMaterialsRequest, UpdateActivityRequest,
        },
        common::{PaginatedResponse, PaginationParams},
    },
    error::StorageError,
    repository::activity::ActivityRepository,
    services::lifecycle::{ActivityLifecycle, CompletionReport},
};

use crate::{error::WebError, middleware::current_user::CurrentUser, state::AppState};

use super::services;

#[utoipa::path(
    get,
    path = "/api/activities",
    params(ActivityFilter, PaginationParams),
    responses(
        (status = 200, description = "List activities successfully", body = PaginatedResponse<ActivityResponse>),
        (status = 400, description = "Invalid pagination parameters")
    ),
    tag = "activities"
)]
pub async fn list_activities(
    State(state): State<AppState>,
    Query(filter): Query<ActivityFilter>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Response, WebError> {
    pagination.validate().map_err(WebError::BadRequest)?;

    let page = services::list_activities(&state, &filter, &pagination);

    Ok(Json(page).into_response())
}

#[utoipa::path(
    get,
    path = "/api/activities/{id}",
    params(
        ("id" = Uuid, Path, description = "Activity ID")
    ),
    responses(
        (status = 200, description = "Activity found", body = ActivityResponse),
        (status = 404, description = "Activity not found")
    ),
    tag = "activities"
)]
pub async fn get_activity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let activity = ActivityRepository::new(state.db.store()).find_by_id(id)?;

    Ok(Json(ActivityResponse::from(activity)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/activities",
    request_body = CreateActivityRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Activity submitted for approval", body = ActivityResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only managers can submit activities")
    ),
    tag = "activities"
)]
pub async fn submit_activity(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(req): Json<CreateActivityRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let activity =
        ActivityLifecycle::new(state.db.store(), &state.engine).submit(&actor, &req, Utc::now())?;

    Ok((StatusCode::CREATED, Json(ActivityResponse::from(activity))).into_response())
}

#[utoipa::path(
    put,
    path = "/api/activities/{id}",
    params(
        ("id" = Uuid, Path, description = "Activity ID")
    ),
    request_body = UpdateActivityRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Activity updated successfully", body = ActivityResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not the owning manager"),
        (status = 404, description = "Activity not found"),
        (status = 409, description = "Activity is no longer pending")
    ),
    tag = "activities"
)]
pub async fn update_activity(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateActivityRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let activity =
        ActivityLifecycle::new(state.db.store(), &state.engine).edit(&actor, id, &req, Utc::now())?;

    Ok(Json(ActivityResponse::from(activity)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/activities/{id}",
    params(
        ("id" = Uuid, Path, description = "Activity ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Activity deleted successfully"),
        (status = 403, description = "Not the owning manager"),
        (status = 404, description = "Activity not found"),
        (status = 409, description = "Activity is no longer pending")
    ),
    tag = "activities"
)]
pub async fn delete_activity(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    ActivityLifecycle::new(state.db.store(), &state.engine).delete(&actor, id)?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    post,
    path = "/api/activities/{id}/approve",
    params(
        ("id" = Uuid, Path, description = "Activity ID")
    ),
    request_body = ApproveActivityRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Activity approved", body = ActivityResponse),
        (status = 403, description = "Administrator role required"),
        (status = 409, description = "Activity is not pending")
    ),
    tag = "activities"
)]
pub async fn approve_activity(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ApproveActivityRequest>,
) -> Result<Response, WebError> {
    let activity = ActivityLifecycle::new(state.db.store(), &state.engine).approve(
        &actor,
        id,
        req.manager_id,
        Utc::now(),
    )?;

    Ok(Json(ActivityResponse::from(activity)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/activities/{id}/reject",
    params(
        ("id" = Uuid, Path, description = "Activity ID")
    ),
    request_body = RejectActivityRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Activity rejected", body = ActivityResponse),
        (status = 403, description = "Administrator role required"),
        (status = 409, description = "Activity is not pending")
    ),
    tag = "activities"
)]
pub async fn reject_activity(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<RejectActivityRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let activity = ActivityLifecycle::new(state.db.store(), &state.engine).reject(
        &actor,
        id,
        req.reason,
        Utc::now(),
    )?;

    Ok(Json(ActivityResponse::from(activity)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/activities/{id}/cancel",
    params(
        ("id" = Uuid, Path, description = "Activity ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Activity cancelled and participants notified", body = ActivityResponse),
        (status = 400, description = "Activity has already started"),
        (status = 409, description = "Activity is not approved")
    ),
    tag = "activities"
)]
pub async fn cancel_activity(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let activity = services::cancel_activity(&state, &actor, id)?;

    Ok(Json(ActivityResponse::from(activity)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/activities/{id}/complete",
    params(
        ("id" = Uuid, Path, description = "Activity ID")
    ),
    request_body = CompleteActivityRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Activity completed and credit applied", body = CompletionReport),
        (status = 400, description = "Activity has not ended or materials are not approved"),
        (status = 409, description = "Activity is not approved")
    ),
    tag = "activities"
)]
pub async fn complete_activity(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CompleteActivityRequest>,
) -> Result<Response, WebError> {
    let report = services::complete_activity(&state, &actor, id, &req)?;

    Ok(Json(report).into_response())
}

#[utoipa::path(
    post,
    path = "/api/activities/auto-complete",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Activities completed by the sweep", body = Vec<CompletionReport>),
        (status = 403, description = "Administrator role required")
    ),
    tag = "activities"
)]
pub async fn auto_complete_activities(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Response, WebError> {
    if !actor.is_admin() {
        return Err(StorageError::Forbidden("administrator role required".to_string()).into());
    }

    let reports = services::auto_complete(&state)?;

    Ok(Json(reports).into_response())
}

#[utoipa::path(
    post,
    path = "/api/activities/{id}/materials",
    params(
        ("id" = Uuid, Path, description = "Activity ID")
    ),
    request_body = SubmitMaterialsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Materials recorded", body = ActivityResponse),
        (status = 400, description = "Validation error")
    ),
    tag = "activities"
)]
pub async fn submit_materials(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitMaterialsRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let activity = ActivityLifecycle::new(state.db.store(), &state.engine).submit_materials(
        &actor,
        id,
        req.files,
        Utc::now(),
    )?;

    Ok(Json(ActivityResponse::from(activity)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/activities/{id}/materials/review",
    params(
        ("id" = Uuid, Path, description = "Activity ID")
    ),
    request_body = ReviewMaterialsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Materials reviewed", body = ActivityResponse),
        (status = 403, description = "Administrator role required")
    ),
    tag = "activities"
)]
pub async fn review_materials(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ReviewMaterialsRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let activity = ActivityLifecycle::new(state.db.store(), &state.engine).review_materials(
        &actor,
        id,
        req.approved,
        req.rejection_reason,
        Utc::now(),
    )?;

    Ok(Json(ActivityResponse::from(activity)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/activities/{id}/relocate",
    params(
        ("id" = Uuid, Path, description = "Activity ID")
    ),
    request_body = RelocateActivityRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Activity relocated", body = ActivityResponse),
        (status = 403, description = "Not the owning manager")
    ),
    tag = "activities"
)]
pub async fn relocate_activity(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<RelocateActivityRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let activity = ActivityLifecycle::new(state.db.store(), &state.engine).relocate(
        &actor,
        id,
        req.location,
        Utc::now(),
    )?;

    Ok(Json(ActivityResponse::from(activity)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/activities/{id}/notified",
    params(
        ("id" = Uuid, Path, description = "Activity ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Participants notified of the location change", body = ActivityResponse),
        (status = 400, description = "Location has not changed"),
        (status = 403, description = "Administrator role required")
    ),
    tag = "activities"
)]
pub async fn mark_participants_notified(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let activity = services::mark_notified(&state, &actor, id)?;

    Ok(Json(ActivityResponse::from(activity)).into_response())
}
