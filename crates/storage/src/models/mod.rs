mod activity;
mod commitment;
mod credit;
mod eligibility;
mod notification;
mod user;
mod warning;

pub use activity::{Activity, ActivityStatus, ActivityType, LifecycleAction, Materials};
pub use commitment::{Commitment, CommitmentRef, ConflictPair};
pub use credit::{CreditEntry, CreditReason};
pub use eligibility::{DenialReason, Eligibility};
pub use notification::Notification;
pub use user::{Actor, CreditTier, Role, User};
pub use warning::{ActivityWarning, Severity, WarningType};
