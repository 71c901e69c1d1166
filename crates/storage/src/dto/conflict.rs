use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Commitment, ConflictPair};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DetectConflictsRequest {
    pub commitments: Vec<Commitment>,
}

/// Extra commitments to check against a volunteer's registrations
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct VolunteerConflictsRequest {
    #[serde(default)]
    pub external_events: Vec<Commitment>,
    pub candidate_activity_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConflictResponse {
    pub conflicts: Vec<ConflictPair>,
}
