use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{Result, StorageError};
use crate::models::{Activity, Role, User};
use crate::repository::Store;
use crate::repository::activity::ActivityRepository;
use crate::repository::user::UserRepository;

/// Cheaply cloneable handle to the shared store.
#[derive(Clone, Default)]
pub struct Database {
    store: Arc<Store>,
}

/// A user as it appears in a seed file. A missing score means a freshly created account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
    pub credit_score: Option<i32>,
    #[serde(default)]
    pub service_hours: Decimal,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a database from a snapshot, validating every activity on the way in.
    pub fn from_snapshot(snapshot: Snapshot, config: &EngineConfig) -> Result<Self> {
        let db = Self::new();
        let now = Utc::now();

        let users = UserRepository::new(db.store());
        for seed in snapshot.users {
            if users.find_by_id(seed.user_id).is_ok() {
                return Err(StorageError::ConstraintViolation(format!(
                    "user {} appears twice in the snapshot",
                    seed.user_id
                )));
            }
            users.insert(User {
                user_id: seed.user_id,
                name: seed.name,
                role: seed.role,
                credit_score: seed.credit_score.unwrap_or(config.initial_credit),
                service_hours: seed.service_hours,
                created_at: seed.created_at.unwrap_or(now),
            });
        }

        let activities = ActivityRepository::new(db.store());
        for activity in snapshot.activities {
            activity.validate_schedule().map_err(|e| {
                StorageError::Validation(format!("activity {}: {}", activity.activity_id, e))
            })?;
            match users.find_by_id(activity.manager_id) {
                Ok(manager) if manager.role == Role::Manager => {}
                _ => {
                    return Err(StorageError::ConstraintViolation(format!(
                        "activity {} is owned by {}, which is not an activity manager",
                        activity.activity_id, activity.manager_id
                    )));
                }
            }
            if let Some(stranger) = activity
                .participants
                .iter()
                .find(|id| users.find_volunteer(**id).is_err())
            {
                return Err(StorageError::ConstraintViolation(format!(
                    "activity {} lists {}, which is not a volunteer",
                    activity.activity_id, stranger
                )));
            }
            if activity.participants.len() > activity.max_participants as usize {
                return Err(StorageError::ConstraintViolation(format!(
                    "activity {} has more participants than seats",
                    activity.activity_id
                )));
            }
            activities.create(activity)?;
        }

        tracing::info!(
            users = users.list(None).len(),
            activities = activities.list().len(),
            "Seeded store from snapshot"
        );

        Ok(db)
    }

    pub fn from_json(json: &str, config: &EngineConfig) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot, config)
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}
