use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Cancelled,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Completed | Self::Cancelled)
    }

    /// The activity transition table.
    ///
    /// Returns the status reached by applying `action`, or `None` when the edge does not exist.
    /// Actions that keep the activity in place (edits, material handling) map a status onto itself.
    pub fn next(self, action: LifecycleAction) -> Option<Self> {
        use ActivityStatus::*;
        use LifecycleAction::*;

        match (self, action) {
            (Pending, Approve) => Some(Approved),
            (Pending, Reject) => Some(Rejected),
            (Pending, Edit) => Some(Pending),
            (Pending, Delete) => Some(Pending),
            (Approved, Cancel) => Some(Cancelled),
            (Approved, Complete) => Some(Completed),
            (Approved, SubmitMaterials) => Some(Approved),
            (Approved, ReviewMaterials) => Some(Approved),
            (Approved, Relocate) => Some(Approved),
            (Approved, MarkNotified) => Some(Approved),
            _ => None,
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations that move (or keep) an activity along its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    Approve,
    Reject,
    Edit,
    Delete,
    Cancel,
    Complete,
    SubmitMaterials,
    ReviewMaterials,
    Relocate,
    MarkNotified,
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Cancel => "cancel",
            Self::Complete => "complete",
            Self::SubmitMaterials => "submit materials for",
            Self::ReviewMaterials => "review materials for",
            Self::Relocate => "relocate",
            Self::MarkNotified => "mark notified",
        };
        f.write_str(verb)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Community,
    Education,
    Environment,
    Healthcare,
    Culture,
    Sports,
    Other,
}

/// Proof-of-completion record attached by the owning manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Materials {
    pub files: Vec<String>,
    pub uploaded_at: DateTime<Utc>,
    pub approved: bool,
    pub rejected: bool,
    pub rejection_reason: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Materials {
    pub fn new(files: Vec<String>, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            files,
            uploaded_at,
            approved: false,
            rejected: false,
            rejection_reason: None,
            reviewed_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Activity {
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
    #[schema(value_type = Vec<Uuid>)]
    #[serde(default)]
    pub participants: BTreeSet<Uuid>,
    pub status: ActivityStatus,
    pub service_hours: Option<Decimal>,
    #[serde(default)]
    pub location_changed: bool,
    #[serde(default)]
    pub participants_notified: bool,
    pub materials: Option<Materials>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Activity {
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.max_participants as usize
    }

    pub fn is_registered(&self, volunteer_id: Uuid) -> bool {
        self.participants.contains(&volunteer_id)
    }

    /// Length of the activity in hours, rounded to two decimal places.
    pub fn scheduled_hours(&self) -> Decimal {
        let minutes = (self.end_time - self.start_time).num_minutes();
        (Decimal::from(minutes) / Decimal::from(60)).round_dp(2)
    }

    /// Instant after which unregistering counts as a late cancellation.
    pub fn cancel_cutoff(&self, cancel_deadline_hours: i64) -> DateTime<Utc> {
        Duration::try_hours(cancel_deadline_hours)
            .and_then(|window| self.start_time.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Cross-field rules shared by submission and edits.
    pub fn validate_schedule(&self) -> Result<(), &'static str> {
        if self.min_participants < 1 {
            return Err("Minimum participants must be at least 1");
        }
        if self.max_participants < self.min_participants {
            return Err("Maximum participants must be greater than or equal to minimum participants");
        }
        if self.end_time <= self.start_time {
            return Err("End time must be after start time");
        }
        if self.registration_deadline > self.start_time {
            return Err("Registration deadline must be on or before start time");
        }
        Ok(())
    }
}
