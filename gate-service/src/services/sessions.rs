//! Session tracking with lazy expiry.
//!
//! Tokens are opaque random values handed to the client; only their SHA-256
//! digest is kept server-side. Expiry is evaluated on read - there is no
//! background reaper, so a session past its window disappears the first
//! time something looks at it.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::models::{Principal, Session};

pub struct SessionService {
    sessions: DashMap<String, Session>,
    ttl_hours: i64,
}

impl SessionService {
    pub fn new(ttl_hours: i64) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl_hours,
        }
    }

    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn generate_token() -> String {
        let mut rng = rand::thread_rng();
        let token_bytes: [u8; 32] = rng.gen();
        hex::encode(token_bytes)
    }

    /// Record a new session for the principal and return the bearer token.
    pub fn start_session(&self, principal: Principal) -> (String, Session) {
        let token = Self::generate_token();
        let session = Session::new(principal, self.ttl_hours);
        self.sessions.insert(Self::hash_token(&token), session.clone());
        (token, session)
    }

    /// Look up a session by raw token, clearing it if expired.
    pub fn resolve(&self, token: &str) -> Option<Session> {
        self.resolve_at(token, Utc::now())
    }

    /// Same as `resolve` with an explicit clock, so tests can advance
    /// logical time and then trigger a read.
    pub fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
        let key = Self::hash_token(token);
        let expired = match self.sessions.get(&key) {
            Some(session) if session.is_valid_at(now) => return Some(session.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.sessions.remove(&key);
            tracing::debug!("Session expired and cleared on read");
        }
        None
    }

    /// Drop the session. Idempotent: ending an unknown or already-ended
    /// session is a no-op.
    pub fn end_session(&self, token: &str) {
        self.sessions.remove(&Self::hash_token(token));
    }

    /// Flip the session-scoped elevation flag after a successful
    /// `security_access` challenge. Returns false if the session is gone.
    pub fn grant_security_access(&self, token: &str) -> bool {
        match self.sessions.get_mut(&Self::hash_token(token)) {
            Some(mut session) => {
                session.security_access_granted = true;
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    fn active_count(&self) -> usize {
        self.sessions.len()
    }
}
