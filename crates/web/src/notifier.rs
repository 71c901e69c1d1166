use volunteer_storage::models::Notification;

/// Delivery channel for notifications the engine says are owed. Fire-and-forget.
pub trait Notifier: Send + Sync {
    fn dispatch(&self, notification: Notification);
}

/// Logs notifications instead of delivering them.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn dispatch(&self, notification: Notification) {
        match &notification {
            Notification::ActivityCancelled {
                activity_id,
                recipients,
                ..
            }
            | Notification::LocationChanged {
                activity_id,
                recipients,
                ..
            } => {
                tracing::info!(
                    %activity_id,
                    recipients = recipients.len(),
                    ?notification,
                    "Notification dispatched"
                );
            }
            Notification::BlacklistEntered { volunteer_id, .. }
            | Notification::BlacklistLifted { volunteer_id, .. } => {
                tracing::info!(%volunteer_id, ?notification, "Notification dispatched");
            }
        }
    }
}
