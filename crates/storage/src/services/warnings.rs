use chrono::{DateTime, Duration, Utc};

use crate::config::EngineConfig;
use crate::models::{Activity, ActivityStatus, ActivityWarning, Severity, WarningType};
use crate::repository::Store;
use crate::repository::activity::ActivityRepository;

/// Scan activities for conditions an administrator should look at. Pure and repeatable.
pub fn generate_warnings(
    activities: &[Activity],
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Vec<ActivityWarning> {
    let window = Duration::days(config.under_subscription_window_days);
    let mut warnings = Vec::new();

    for activity in activities
        .iter()
        .filter(|a| a.status == ActivityStatus::Approved)
    {
        let starts_in = activity.start_time - now;
        let current = activity.participant_count() as u64;
        let required = u64::from(activity.min_participants);

        if starts_in >= Duration::zero()
            && starts_in <= window
            && current * 100 < required * u64::from(config.under_subscription_percent)
        {
            warnings.push(ActivityWarning {
                activity_id: activity.activity_id,
                warning_type: WarningType::UnderSubscription,
                message: format!(
                    "\"{}\" starts in {} hours with {} of {} required participants",
                    activity.title,
                    starts_in.num_hours(),
                    current,
                    required
                ),
                severity: Severity::High,
            });
        }

        if activity.location_changed && !activity.participants_notified {
            warnings.push(ActivityWarning {
                activity_id: activity.activity_id,
                warning_type: WarningType::UnnotifiedLocationChange,
                message: format!(
                    "\"{}\" moved to {} but participants have not been notified",
                    activity.title, activity.location
                ),
                severity: Severity::Medium,
            });
        }
    }

    // Stable sort keeps start-time order within a severity.
    warnings.sort_by(|a, b| b.severity.cmp(&a.severity));
    warnings
}

/// Sweep every stored activity.
pub fn scan(store: &Store, now: DateTime<Utc>, config: &EngineConfig) -> Vec<ActivityWarning> {
    let activities = ActivityRepository::new(store).list();
    let warnings = generate_warnings(&activities, now, config);
    tracing::debug!(
        activities = activities.len(),
        warnings = warnings.len(),
        "Warning sweep finished"
    );
    warnings
}
