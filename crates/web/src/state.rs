use std::sync::Arc;

use axum::extract::FromRef;
use volunteer_storage::{Database, EngineConfig, models::Notification};

use crate::notifier::Notifier;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub engine: Arc<EngineConfig>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(db: Database, engine: EngineConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            db,
            engine: Arc::new(engine),
            notifier,
        }
    }

    pub fn notify_all(&self, notifications: impl IntoIterator<Item = Notification>) {
        for notification in notifications {
            self.notifier.dispatch(notification);
        }
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
