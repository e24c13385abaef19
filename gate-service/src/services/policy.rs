//! Secret format policy - caller-side preconditions for credential updates.
//!
//! The PIN length range is a single configurable policy value so every
//! surface that checks a PIN agrees on what well-formed means.

use serde::Deserialize;
use thiserror::Error;

pub const PASSWORD_MIN_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct PinPolicy {
    pub min_len: usize,
    pub max_len: usize,
}

impl Default for PinPolicy {
    fn default() -> Self {
        Self {
            min_len: 4,
            max_len: 4,
        }
    }
}

impl PinPolicy {
    /// A well-formed PIN is digits only, with length inside the policy range.
    pub fn is_well_formed(&self, pin: &str) -> bool {
        let len = pin.chars().count();
        len >= self.min_len && len <= self.max_len && pin.chars().all(|c| c.is_ascii_digit())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("PIN must be {min}-{max} digits")]
    MalformedPin { min: usize, max: usize },

    #[error("Password must be at least {min} characters (got {actual})")]
    PasswordTooShort { min: usize, actual: usize },

    #[error("New secret and confirmation do not match")]
    ConfirmationMismatch,

    #[error("New secret must be different from the current one")]
    SecretReused,
}

/// Validate a replacement PIN before it ever reaches the store.
pub fn validate_new_pin(policy: &PinPolicy, new_pin: &str, confirm: &str) -> Result<(), PolicyError> {
    if !policy.is_well_formed(new_pin) {
        return Err(PolicyError::MalformedPin {
            min: policy.min_len,
            max: policy.max_len,
        });
    }
    if new_pin != confirm {
        return Err(PolicyError::ConfirmationMismatch);
    }
    Ok(())
}

/// Validate a replacement password before it ever reaches the store.
pub fn validate_new_password(new_password: &str, confirm: &str) -> Result<(), PolicyError> {
    let len = new_password.chars().count();
    if len < PASSWORD_MIN_LENGTH {
        return Err(PolicyError::PasswordTooShort {
            min: PASSWORD_MIN_LENGTH,
            actual: len,
        });
    }
    if new_password != confirm {
        return Err(PolicyError::ConfirmationMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_accepts_exactly_four_digits() {
        let policy = PinPolicy::default();
        assert!(policy.is_well_formed("1234"));
        assert!(!policy.is_well_formed("123"));
        assert!(!policy.is_well_formed("12345"));
        assert!(!policy.is_well_formed("12a4"));
        assert!(!policy.is_well_formed(""));
    }

    #[test]
    fn widened_policy_accepts_up_to_six_digits() {
        let policy = PinPolicy {
            min_len: 4,
            max_len: 6,
        };
        assert!(policy.is_well_formed("1234"));
        assert!(policy.is_well_formed("123456"));
        assert!(!policy.is_well_formed("1234567"));
    }

    #[test]
    fn new_pin_must_match_confirmation() {
        let policy = PinPolicy::default();
        assert_eq!(
            validate_new_pin(&policy, "5678", "5679"),
            Err(PolicyError::ConfirmationMismatch)
        );
        assert!(validate_new_pin(&policy, "5678", "5678").is_ok());
    }

    #[test]
    fn password_minimum_length_enforced() {
        assert_eq!(
            validate_new_password("short", "short"),
            Err(PolicyError::PasswordTooShort { min: 8, actual: 5 })
        );
        assert!(validate_new_password("longenough", "longenough").is_ok());
    }
}
