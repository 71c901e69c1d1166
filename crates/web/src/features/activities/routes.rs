use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use super::handlers::{
    approve_activity, auto_complete_activities, cancel_activity, complete_activity,
    delete_activity, get_activity, list_activities, mark_participants_notified,
    reject_activity, relocate_activity, review_materials, submit_activity, submit_materials,
    update_activity,
};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(submit_activity))
        .route("/auto-complete", post(auto_complete_activities))
        .route("/:id", put(update_activity).delete(delete_activity))
        .route("/:id/approve", post(approve_activity))
        .route("/:id/reject", post(reject_activity))
        .route("/:id/cancel", post(cancel_activity))
        .route("/:id/complete", post(complete_activity))
        .route("/:id/materials", post(submit_materials))
        .route("/:id/materials/review", post(review_materials))
        .route("/:id/relocate", post(relocate_activity))
        .route("/:id/notified", post(mark_participants_notified))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_activities))
        .route("/:id", get(get_activity))
        .merge(protected)
}
