use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use super::{ActivityHandle, Store};
use crate::error::{Result, StorageError};
use crate::models::Activity;

/// Repository for activity records held in the [`Store`]
pub struct ActivityRepository<'a> {
    store: &'a Store,
}

impl<'a> ActivityRepository<'a> {
    /// Create a new ActivityRepository
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// List all activities, earliest start first
    pub fn list(&self) -> Vec<Activity> {
        let handles: Vec<ActivityHandle> = self.store.activities.read().values().cloned().collect();

        let mut activities: Vec<Activity> = handles.iter().map(|h| h.lock().clone()).collect();
        activities.sort_by(|a, b| {
            a.start_time
                .cmp(&b.start_time)
                .then_with(|| a.activity_id.cmp(&b.activity_id))
        });
        activities
    }

    /// Activities the volunteer currently holds a registration for
    pub fn list_for_volunteer(&self, volunteer_id: Uuid) -> Vec<Activity> {
        self.list()
            .into_iter()
            .filter(|a| a.is_registered(volunteer_id))
            .collect()
    }

    /// Get an activity by ID
    pub fn find_by_id(&self, id: Uuid) -> Result<Activity> {
        let handle = self.handle(id)?;
        let activity = handle.lock().clone();
        Ok(activity)
    }

    pub(crate) fn handle(&self, id: Uuid) -> Result<ActivityHandle> {
        self.store
            .activities
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::activity_not_found(id))
    }

    /// Insert a new activity
    pub fn create(&self, activity: Activity) -> Result<Activity> {
        let mut activities = self.store.activities.write();
        if activities.contains_key(&activity.activity_id) {
            return Err(StorageError::ConstraintViolation(format!(
                "Activity {} already exists",
                activity.activity_id
            )));
        }

        activities.insert(activity.activity_id, Arc::new(Mutex::new(activity.clone())));
        Ok(activity)
    }

    /// Apply a patch to an activity under its lock.
    ///
    /// The patch runs against a copy; the stored record only changes when the patch succeeds.
    pub fn update<T>(
        &self,
        id: Uuid,
        patch: impl FnOnce(&mut Activity) -> Result<T>,
    ) -> Result<(Activity, T)> {
        let handle = self.handle(id)?;
        let mut stored = handle.lock();

        let mut draft = stored.clone();
        let output = patch(&mut draft)?;
        *stored = draft;

        Ok((stored.clone(), output))
    }

    /// Delete an activity after `guard` approves the current record
    pub fn delete(&self, id: Uuid, guard: impl FnOnce(&Activity) -> Result<()>) -> Result<Activity> {
        let mut activities = self.store.activities.write();
        let handle = activities
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::activity_not_found(id))?;

        let removed = {
            let activity = handle.lock();
            guard(&activity)?;
            activity.clone()
        };
        activities.remove(&id);

        Ok(removed)
    }
}
