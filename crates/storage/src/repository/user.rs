use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::Store;
use crate::error::{Result, StorageError};
use crate::models::{CreditEntry, Role, User};

/// Read side of the user directory. Credit scores are written only by the credit ledger.
pub struct UserRepository<'a> {
    store: &'a Store,
}

impl<'a> UserRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// List users, optionally restricted to one role, ordered by name
    pub fn list(&self, role: Option<Role>) -> Vec<User> {
        let directory = self.store.directory.read();
        let mut users: Vec<User> = directory
            .users
            .values()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.user_id.cmp(&b.user_id)));
        users
    }

    pub fn find_by_id(&self, id: Uuid) -> Result<User> {
        self.store
            .directory
            .read()
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::user_not_found(id))
    }

    /// Like [`find_by_id`](Self::find_by_id) but only matches volunteers
    pub fn find_volunteer(&self, id: Uuid) -> Result<User> {
        match self.find_by_id(id)? {
            user if user.is_volunteer() => Ok(user),
            _ => Err(StorageError::NotFound {
                entity: "Volunteer",
                id,
            }),
        }
    }

    /// Add a user with an explicit starting score
    pub fn create(
        &self,
        name: impl Into<String>,
        role: Role,
        credit_score: i32,
        created_at: DateTime<Utc>,
    ) -> User {
        let user = User {
            user_id: Uuid::new_v4(),
            name: name.into(),
            role,
            credit_score,
            service_hours: Decimal::ZERO,
            created_at,
        };
        self.insert(user.clone());
        user
    }

    pub(crate) fn insert(&self, user: User) {
        self.store.directory.write().users.insert(user.user_id, user);
    }

    /// Credit history for one volunteer, oldest first
    pub fn credit_history(&self, volunteer_id: Uuid) -> Result<Vec<CreditEntry>> {
        let directory = self.store.directory.read();
        if !directory.users.contains_key(&volunteer_id) {
            return Err(StorageError::user_not_found(volunteer_id));
        }

        Ok(directory
            .credit_log
            .iter()
            .filter(|e| e.volunteer_id == volunteer_id)
            .cloned()
            .collect())
    }
}
