pub mod activity;
pub mod user;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use crate::models::{Activity, CreditEntry, User};

/// Authoritative in-memory state shared by every repository and service.
///
/// Lock order: the activity map is only held long enough to clone a handle, then the
/// per-activity mutex, then the directory. Never the reverse.
#[derive(Default)]
pub struct Store {
    pub(crate) activities: RwLock<HashMap<Uuid, ActivityHandle>>,
    pub(crate) directory: RwLock<Directory>,
}

pub(crate) type ActivityHandle = Arc<Mutex<Activity>>;

/// Users and the credit log live behind one lock so ledger batches commit together.
#[derive(Debug, Default)]
pub(crate) struct Directory {
    pub(crate) users: HashMap<Uuid, User>,
    pub(crate) credit_log: Vec<CreditEntry>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }
}
