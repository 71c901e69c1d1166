use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use volunteer_storage::{models::ActivityWarning, services::warnings};

use crate::{error::WebError, state::AppState};

#[utoipa::path(
    get,
    path = "/api/warnings",
    responses(
        (status = 200, description = "Advisory warnings for approved activities, most severe first", body = Vec<ActivityWarning>)
    ),
    tag = "warnings"
)]
pub async fn list_warnings(State(state): State<AppState>) -> Result<Response, WebError> {
    let warnings = warnings::scan(state.db.store(), Utc::now(), &state.engine);

    Ok(Json(warnings).into_response())
}
