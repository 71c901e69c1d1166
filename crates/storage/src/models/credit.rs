use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::EngineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CreditReason {
    NoShow,
    LateCancel,
    ActivityCompleted,
    Manual,
    AdminOverride,
}

impl CreditReason {
    /// Configured delta for the standard reasons. Manual and override amounts come from the caller.
    pub fn standard_delta(&self, config: &EngineConfig) -> Option<i32> {
        match self {
            Self::NoShow => Some(-config.no_show_penalty),
            Self::LateCancel => Some(-config.late_cancel_penalty),
            Self::ActivityCompleted => Some(config.activity_completion_bonus),
            Self::Manual | Self::AdminOverride => None,
        }
    }
}

/// One line of a volunteer's credit history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreditEntry {
    pub volunteer_id: Uuid,
    pub delta: i32,
    pub reason: CreditReason,
    pub score_after: i32,
    pub activity_id: Option<Uuid>,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}
