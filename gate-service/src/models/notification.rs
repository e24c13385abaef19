//! District notifications emitted when gated mutations execute.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Edit,
    Delete,
    BulkEdit,
    BulkDelete,
    SecurityAccess,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub congregation_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        notification_type: NotificationType,
        title: String,
        message: String,
        congregation_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            notification_type,
            title,
            message,
            congregation_id,
            created_at: Utc::now(),
        }
    }
}
