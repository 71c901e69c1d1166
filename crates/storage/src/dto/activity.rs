use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Activity, ActivityStatus, ActivityType, Materials};

/// Request payload for submitting a new activity
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateActivityRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters"
    ))]
    pub title: String,

    #[validate(length(max = 5000))]
    #[serde(default)]
    pub description: String,

    pub activity_type: ActivityType,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Location must be between 1 and 255 characters"
    ))]
    pub location: String,

    pub start_time: DateTime<Utc>,

    pub end_time: DateTime<Utc>,

    pub registration_deadline: DateTime<Utc>,

    #[validate(range(min = 1, message = "At least one participant is required"))]
    pub min_participants: u32,

    #[validate(range(min = 1, max = 10000))]
    pub max_participants: u32,
}

/// Request payload for editing a pending activity
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateActivityRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    pub activity_type: Option<ActivityType>,

    #[validate(length(min = 1, max = 255))]
    pub location: Option<String>,

    pub start_time: Option<DateTime<Utc>>,

    pub end_time: Option<DateTime<Utc>>,

    pub registration_deadline: Option<DateTime<Utc>>,

    #[validate(range(min = 1))]
    pub min_participants: Option<u32>,

    #[validate(range(min = 1, max = 10000))]
    pub max_participants: Option<u32>,
}

impl UpdateActivityRequest {
    pub fn apply(&self, activity: &mut Activity) {
        if let Some(title) = &self.title {
            activity.title = title.clone();
        }
        if let Some(description) = &self.description {
            activity.description = description.clone();
        }
        if let Some(activity_type) = self.activity_type {
            activity.activity_type = activity_type;
        }
        if let Some(location) = &self.location {
            activity.location = location.clone();
        }
        if let Some(start_time) = self.start_time {
            activity.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            activity.end_time = end_time;
        }
        if let Some(deadline) = self.registration_deadline {
            activity.registration_deadline = deadline;
        }
        if let Some(min) = self.min_participants {
            activity.min_participants = min;
        }
        if let Some(max) = self.max_participants {
            activity.max_participants = max;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ApproveActivityRequest {
    /// Reassigns the owning manager on approval
    pub manager_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct RejectActivityRequest {
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CompleteActivityRequest {
    /// Volunteers confirmed present. Omit to treat every registrant as present.
    #[schema(value_type = Option<Vec<Uuid>>)]
    pub present: Option<BTreeSet<Uuid>>,

    /// Overrides the hours derived from the schedule
    pub service_hours: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SubmitMaterialsRequest {
    #[validate(length(min = 1, message = "At least one file is required"))]
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReviewMaterialsRequest {
    pub approved: bool,

    #[validate(length(max = 1000))]
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RelocateActivityRequest {
    #[validate(length(min = 1, max = 255))]
    pub location: String,
}

/// Optional filters for listing activities
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActivityFilter {
    pub status: Option<ActivityStatus>,
    pub manager_id: Option<Uuid>,
    pub activity_type: Option<ActivityType>,
}

impl ActivityFilter {
    pub fn matches(&self, activity: &Activity) -> bool {
        self.status.is_none_or(|s| activity.status == s)
            && self.manager_id.is_none_or(|m| activity.manager_id == m)
            && self.activity_type.is_none_or(|t| activity.activity_type == t)
    }
}

/// Response containing activity details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityResponse {
    pub activity_id: Uuid,
    pub title: String,
    pub description: String,
    pub activity_type: ActivityType,
    pub location: String,
    pub manager_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub min_participants: u32,
    pub max_participants: u32,
    pub current_participants: usize,
    pub participants: Vec<Uuid>,
    pub status: ActivityStatus,
    pub service_hours: Option<Decimal>,
    pub location_changed: bool,
    pub participants_notified: bool,
    pub materials: Option<Materials>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Activity> for ActivityResponse {
    fn from(activity: Activity) -> Self {
        Self {
            activity_id: activity.activity_id,
            title: activity.title,
            description: activity.description,
            activity_type: activity.activity_type,
            location: activity.location,
            manager_id: activity.manager_id,
            start_time: activity.start_time,
            end_time: activity.end_time,
            registration_deadline: activity.registration_deadline,
            min_participants: activity.min_participants,
            max_participants: activity.max_participants,
            current_participants: activity.participants.len(),
            participants: activity.participants.into_iter().collect(),
            status: activity.status,
            service_hours: activity.service_hours,
            location_changed: activity.location_changed,
            participants_notified: activity.participants_notified,
            materials: activity.materials,
            rejection_reason: activity.rejection_reason,
            created_at: activity.created_at,
            updated_at: activity.updated_at,
            completed_at: activity.completed_at,
        }
    }
}
