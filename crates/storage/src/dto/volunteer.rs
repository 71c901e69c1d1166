use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::config::EngineConfig;
use crate::models::{CreditTier, User};

/// Volunteer profile with its derived tier
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VolunteerResponse {
    pub user_id: Uuid,
    pub name: String,
    pub credit_score: i32,
    pub tier: CreditTier,
    pub service_hours: Decimal,
}

impl VolunteerResponse {
    pub fn new(user: User, config: &EngineConfig) -> Self {
        Self {
            tier: config.tier_for(user.credit_score),
            user_id: user.user_id,
            name: user.name,
            credit_score: user.credit_score,
            service_hours: user.service_hours,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreditAdjustmentRequest {
    #[validate(range(min = -1000, max = 1000))]
    pub delta: i32,

    #[validate(length(max = 500))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreditOverrideRequest {
    #[validate(range(min = -1000, max = 100000))]
    pub credit_score: i32,
}
