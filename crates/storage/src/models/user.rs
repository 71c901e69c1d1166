use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Volunteer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => f.write_str("admin"),
            Self::Manager => f.write_str("manager"),
            Self::Volunteer => f.write_str("volunteer"),
        }
    }
}

/// Eligibility classification derived from a credit score. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CreditTier {
    Blacklisted,
    Normal,
    Excellent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
    /// Only meaningful for volunteers; written exclusively by the credit ledger.
    pub credit_score: i32,
    /// Cumulative, never decreases.
    #[serde(default)]
    pub service_hours: Decimal,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn is_volunteer(&self) -> bool {
        self.role == Role::Volunteer
    }
}

/// Identity of whoever is invoking an operation, as supplied by the session provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::new(user.user_id, user.role)
    }
}
