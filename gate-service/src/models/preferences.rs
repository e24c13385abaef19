//! Per-congregation security preference flags.
//!
//! These are non-secret toggles; actual secrets never live in the
//! key-value store.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SecurityPreferences {
    #[serde(default)]
    pub two_factor_auth: bool,
    #[serde(default = "default_require_pin")]
    pub require_pin_for_actions: bool,
}

fn default_require_pin() -> bool {
    true
}

impl Default for SecurityPreferences {
    fn default() -> Self {
        Self {
            two_factor_auth: false,
            require_pin_for_actions: true,
        }
    }
}

impl SecurityPreferences {
    /// Storage key for a congregation's preference blob.
    pub fn storage_key(congregation_name: &str) -> String {
        format!("security_{}", congregation_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let prefs: SecurityPreferences = serde_json::from_str("{}").unwrap();
        assert!(!prefs.two_factor_auth);
        assert!(prefs.require_pin_for_actions);
    }

    #[test]
    fn storage_key_is_per_congregation() {
        assert_eq!(
            SecurityPreferences::storage_key("Emmanuel Congregation Ahinsan"),
            "security_Emmanuel Congregation Ahinsan"
        );
    }
}
