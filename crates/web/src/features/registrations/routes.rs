use axum::{
    Router, middleware,
    routing::{get, post},
};

use super::handlers::{check_eligibility, register, unregister};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/:id/registrations", post(register).delete(unregister))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/:id/eligibility", get(check_eligibility))
        .merge(protected)
}
