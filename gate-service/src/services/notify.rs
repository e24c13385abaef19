//! Notification sink for district-visible audit events. Injected so the
//! gate never knows where notifications land.

use std::sync::Mutex;

use crate::models::Notification;

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Default sink: structured log lines. The district dashboard reads these
/// from the log pipeline; there is no notification storage in this system.
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        tracing::info!(
            notification_type = ?notification.notification_type,
            congregation_id = %notification.congregation_id,
            title = %notification.title,
            "{}",
            notification.message
        );
    }
}

/// Sink that records notifications for assertions in tests.
#[derive(Default)]
pub struct CollectingSink {
    sent: Mutex<Vec<Notification>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().expect("sink lock poisoned").clone()
    }
}

impl NotificationSink for CollectingSink {
    fn notify(&self, notification: Notification) {
        self.sent
            .lock()
            .expect("sink lock poisoned")
            .push(notification);
    }
}
