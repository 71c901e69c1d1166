use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{DenialReason, Eligibility};

/// Result of an eligibility check or registration attempt
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EligibilityResponse {
    pub activity_id: Uuid,
    pub volunteer_id: Uuid,
    pub eligible: bool,
    pub reason: Option<DenialReason>,
    pub message: Option<String>,
}

impl EligibilityResponse {
    pub fn new(activity_id: Uuid, volunteer_id: Uuid, eligibility: Eligibility) -> Self {
        let reason = eligibility.denial();
        Self {
            activity_id,
            volunteer_id,
            eligible: eligibility.is_eligible(),
            reason,
            message: reason.map(|r| r.message().to_string()),
        }
    }
}
