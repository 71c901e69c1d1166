use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use uuid::Uuid;
use volunteer_storage::{Database, models::Actor, repository::user::UserRepository};

use crate::error::WebError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The acting user, resolved from the `X-User-Id` header against the user directory.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    Database: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .ok_or(WebError::Unauthorized)?;

        let db = Database::from_ref(state);
        let user = UserRepository::new(db.store())
            .find_by_id(user_id)
            .map_err(|_| {
                tracing::warn!(%user_id, "Request from unknown user");
                WebError::Unauthorized
            })?;

        Ok(Self(Actor::from(&user)))
    }
}
