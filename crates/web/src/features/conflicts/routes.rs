use axum::{Router, routing::post};

use super::handlers::detect_conflicts;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", post(detect_conflicts))
}
