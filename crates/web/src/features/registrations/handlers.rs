use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use uuid::Uuid;
use volunteer_storage::{
    dto::registration::EligibilityResponse,
    models::Eligibility,
    services::eligibility::Withdrawal,
};

use crate::{error::WebError, middleware::current_user::CurrentUser, state::AppState};

use super::services;

#[utoipa::path(
    get,
    path = "/api/activities/{id}/eligibility",
    params(
        ("id" = Uuid, Path, description = "Activity ID")
    ),
    responses(
        (status = 200, description = "Whether the acting volunteer may register", body = EligibilityResponse),
        (status = 401, description = "Missing or unknown X-User-Id"),
        (status = 404, description = "Activity not found")
    ),
    tag = "registrations"
)]
pub async fn check_eligibility(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let eligibility = services::check_eligibility(&state, actor.user_id, id)?;

    Ok(Json(EligibilityResponse::new(id, actor.user_id, eligibility)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/activities/{id}/registrations",
    params(
        ("id" = Uuid, Path, description = "Activity ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Volunteer registered", body = EligibilityResponse),
        (status = 404, description = "Activity not found"),
        (status = 409, description = "Registration denied, see reason")
    ),
    tag = "registrations"
)]
pub async fn register(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    match services::register(&state, actor.user_id, id)? {
        Eligibility::Eligible => Ok((
            StatusCode::CREATED,
            Json(EligibilityResponse::new(id, actor.user_id, Eligibility::Eligible)),
        )
            .into_response()),
        Eligibility::Denied(reason) => Err(WebError::Denied(reason)),
    }
}

#[utoipa::path(
    delete,
    path = "/api/activities/{id}/registrations",
    params(
        ("id" = Uuid, Path, description = "Activity ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Registration withdrawn", body = Withdrawal),
        (status = 404, description = "Activity not found"),
        (status = 409, description = "Cancellation denied, see reason")
    ),
    tag = "registrations"
)]
pub async fn unregister(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    match services::unregister(&state, actor.user_id, id)? {
        Withdrawal::Denied { reason } => Err(WebError::Denied(reason)),
        withdrawn => Ok(Json(withdrawn).into_response()),
    }
}
