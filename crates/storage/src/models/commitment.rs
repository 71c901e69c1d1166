use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Activity;

/// A time-boxed obligation: either an activity or an external fixed event such as a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Commitment {
    pub id: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl From<&Activity> for Commitment {
    fn from(activity: &Activity) -> Self {
        Self {
            id: activity.activity_id.to_string(),
            title: activity.title.clone(),
            start_time: activity.start_time,
            end_time: activity.end_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct CommitmentRef {
    pub id: String,
    pub title: String,
}

impl From<&Commitment> for CommitmentRef {
    fn from(commitment: &Commitment) -> Self {
        Self {
            id: commitment.id.clone(),
            title: commitment.title.clone(),
        }
    }
}

/// Two overlapping commitments and the window they share. `first` starts no later than `second`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConflictPair {
    pub first: CommitmentRef,
    pub second: CommitmentRef,
    pub overlap_start: DateTime<Utc>,
    pub overlap_end: DateTime<Utc>,
}

impl ConflictPair {
    pub fn involves(&self, id: &str) -> bool {
        self.first.id == id || self.second.id == id
    }
}
