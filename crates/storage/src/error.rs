use thiserror::Error;
use uuid::Uuid;

use crate::models::{ActivityStatus, LifecycleAction};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cannot {action} an activity that is {from}")]
    InvalidTransition {
        from: ActivityStatus,
        action: LifecycleAction,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn activity_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "Activity",
            id,
        }
    }

    pub fn user_not_found(id: Uuid) -> Self {
        Self::NotFound { entity: "User", id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }

    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, StorageError::InvalidTransition { .. })
    }
}
