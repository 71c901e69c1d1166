use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{
    adjust_credit, credit_history, get_volunteer, list_volunteers, override_credit,
    registered_activities, volunteer_conflicts,
};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/:id/credit", post(adjust_credit).put(override_credit))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_volunteers))
        .route("/:id", get(get_volunteer))
        .route("/:id/credit", get(credit_history))
        .route("/:id/activities", get(registered_activities))
        .route("/:id/conflicts", post(volunteer_conflicts))
        .merge(protected)
}
