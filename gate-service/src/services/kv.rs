//! Key-value store abstraction.
//!
//! Injected so callers never touch an ambient store directly. Only
//! non-secret preference data goes through here.

use dashmap::DashMap;
use std::sync::Arc;

use crate::models::SecurityPreferences;
use crate::services::ServiceError;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

/// In-memory backing store. The system deliberately has no real
/// persistence layer; everything lives for the process lifetime.
#[derive(Default)]
pub struct InMemoryStore {
    entries: DashMap<String, String>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}

/// Typed access to the per-congregation security preference blob.
#[derive(Clone)]
pub struct PreferencesService {
    store: Arc<dyn KeyValueStore>,
}

impl PreferencesService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load preferences for a congregation, falling back to defaults on
    /// a missing or unreadable blob.
    pub fn security(&self, congregation_name: &str) -> SecurityPreferences {
        let key = SecurityPreferences::storage_key(congregation_name);
        match self.store.get(&key) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(key = %key, error = %e, "Unreadable security preferences, using defaults");
                SecurityPreferences::default()
            }),
            None => SecurityPreferences::default(),
        }
    }

    pub fn set_security(
        &self,
        congregation_name: &str,
        prefs: &SecurityPreferences,
    ) -> Result<(), ServiceError> {
        let key = SecurityPreferences::storage_key(congregation_name);
        let raw = serde_json::to_string(prefs)
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Serialize preferences: {}", e)))?;
        self.store.set(&key, raw);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove_roundtrip() {
        let store = InMemoryStore::new();
        assert!(store.get("k").is_none());
        store.set("k", "v".to_string());
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.remove("k");
        assert!(store.get("k").is_none());
    }

    #[test]
    fn preferences_default_when_absent_or_corrupt() {
        let store = Arc::new(InMemoryStore::new());
        let prefs = PreferencesService::new(store.clone());

        assert_eq!(
            prefs.security("Emmanuel Congregation Ahinsan"),
            SecurityPreferences::default()
        );

        store.set(
            &SecurityPreferences::storage_key("Emmanuel Congregation Ahinsan"),
            "not-json".to_string(),
        );
        assert_eq!(
            prefs.security("Emmanuel Congregation Ahinsan"),
            SecurityPreferences::default()
        );
    }

    #[test]
    fn preferences_persist_per_congregation() {
        let prefs = PreferencesService::new(Arc::new(InMemoryStore::new()));
        let updated = SecurityPreferences {
            two_factor_auth: true,
            require_pin_for_actions: false,
        };
        prefs.set_security("NOM", &updated).unwrap();

        assert_eq!(prefs.security("NOM"), updated);
        assert_eq!(prefs.security("Kokobriko"), SecurityPreferences::default());
    }
}
