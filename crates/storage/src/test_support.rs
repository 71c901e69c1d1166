use std::collections::BTreeSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::models::{Activity, ActivityStatus, ActivityType, Actor, Role, User};
use crate::repository::Store;
use crate::repository::activity::ActivityRepository;
use crate::repository::user::UserRepository;

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap()
}

/// An approved, empty activity starting a week after `now`, two hours long.
pub fn approved_activity(now: DateTime<Utc>, max_participants: u32) -> Activity {
    let start = now + Duration::days(7);
    Activity {
        activity_id: Uuid::new_v4(),
        title: "Campus cleanup".to_string(),
        description: "Litter picking around the lake".to_string(),
        activity_type: ActivityType::Environment,
        location: "North lake".to_string(),
        manager_id: Uuid::new_v4(),
        start_time: start,
        end_time: start + Duration::hours(2),
        registration_deadline: start - Duration::days(1),
        min_participants: 1,
        max_participants,
        participants: BTreeSet::new(),
        status: ActivityStatus::Approved,
        service_hours: None,
        location_changed: false,
        participants_notified: false,
        materials: None,
        rejection_reason: None,
        created_at: now,
        updated_at: now,
        completed_at: None,
    }
}

pub fn add_user(store: &Store, role: Role, credit_score: i32) -> User {
    UserRepository::new(store).create(format!("{role}-{credit_score}"), role, credit_score, base_time())
}

pub fn actor(user: &User) -> Actor {
    Actor::from(user)
}

pub fn insert(store: &Store, activity: Activity) -> Activity {
    ActivityRepository::new(store).create(activity).unwrap()
}
