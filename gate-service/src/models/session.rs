//! Session model - a time-bounded grant of logged-in status.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::congregation::Principal;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Session {
    pub session_id: Uuid,
    pub principal: Principal,
    pub granted_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// True only after a successful `security_access` PIN challenge in
    /// this session. Resets with the session, not on navigation.
    pub security_access_granted: bool,
}

impl Session {
    pub fn new(principal: Principal, ttl_hours: i64) -> Self {
        Self::new_at(principal, ttl_hours, Utc::now())
    }

    pub fn new_at(principal: Principal, ttl_hours: i64, now: DateTime<Utc>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            principal,
            granted_at: now,
            expires_at: now + Duration::hours(ttl_hours),
            security_access_granted: false,
        }
    }

    /// A session is valid iff `now < expires_at`. Expiry is evaluated
    /// lazily at read time; there is no background timer.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}
