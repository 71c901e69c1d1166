use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A notification the engine has decided is owed. Delivery belongs to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    ActivityCancelled {
        activity_id: Uuid,
        title: String,
        recipients: Vec<Uuid>,
    },
    LocationChanged {
        activity_id: Uuid,
        location: String,
        recipients: Vec<Uuid>,
    },
    BlacklistEntered {
        volunteer_id: Uuid,
        credit_score: i32,
    },
    BlacklistLifted {
        volunteer_id: Uuid,
        credit_score: i32,
    },
}
