use axum::{
    Json,
    response::{IntoResponse, Response},
};
use volunteer_storage::{
    dto::conflict::{ConflictResponse, DetectConflictsRequest},
    services::conflict::find_conflicts,
};

use crate::error::WebError;

#[utoipa::path(
    post,
    path = "/api/conflicts",
    request_body = DetectConflictsRequest,
    responses(
        (status = 200, description = "Overlapping pairs among the supplied commitments", body = ConflictResponse)
    ),
    tag = "conflicts"
)]
pub async fn detect_conflicts(Json(req): Json<DetectConflictsRequest>) -> Result<Response, WebError> {
    let conflicts = find_conflicts(&req.commitments);

    Ok(Json(ConflictResponse { conflicts }).into_response())
}
