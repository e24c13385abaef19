//! Credential store - resolves (identity, submitted secret, scope) to
//! grant or deny.
//!
//! Secrets are Argon2id-hashed at this boundary. There is deliberately no
//! way to read a stored PIN back out.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::models::{Congregation, Principal};
use crate::services::policy::{self, PinPolicy, PolicyError};
use crate::services::ServiceError;
use crate::utils::{hash_secret, matches_hash, Secret, SecretHash};

/// One record per congregation (the scope). Secrets are stored hashed and
/// overwritten in place on rotation.
struct CredentialRecord {
    congregation: Congregation,
    password_hash: SecretHash,
    pin_hash: SecretHash,
}

/// Seed data consumed once at startup.
pub struct SeedCredential {
    pub congregation: Congregation,
    pub password: String,
    pub pin: String,
}

/// Asynchronous validation seam the gate depends on. The store below is
/// in-process, but the gate treats validation as a suspendable call and
/// applies its timeout to it.
#[async_trait]
pub trait CredentialValidator: Send + Sync {
    async fn validate(
        &self,
        identity: &str,
        submitted: &str,
        scope: Uuid,
    ) -> Result<bool, anyhow::Error>;
}

pub struct CredentialStore {
    records: DashMap<Uuid, CredentialRecord>,
    policy: PinPolicy,
}

impl CredentialStore {
    pub fn new(policy: PinPolicy) -> Self {
        Self {
            records: DashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> PinPolicy {
        self.policy
    }

    /// Hash and load seed credentials. Hashing happens here so plaintext
    /// seeds never live past startup.
    pub fn seed(policy: PinPolicy, entries: Vec<SeedCredential>) -> Result<Self, anyhow::Error> {
        let store = Self::new(policy);
        for entry in entries {
            let record = CredentialRecord {
                password_hash: hash_secret(&Secret::new(entry.password))?,
                pin_hash: hash_secret(&Secret::new(entry.pin))?,
                congregation: entry.congregation,
            };
            store.records.insert(record.congregation.id, record);
        }
        tracing::info!(count = store.records.len(), "Credential store seeded");
        Ok(store)
    }

    pub fn congregations(&self) -> Vec<Congregation> {
        let mut all: Vec<Congregation> = self
            .records
            .iter()
            .map(|r| r.congregation.clone())
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn find_congregation(&self, scope: Uuid) -> Option<Congregation> {
        self.records.get(&scope).map(|r| r.congregation.clone())
    }

    /// Login check. Unknown username and wrong password produce the same
    /// error so callers cannot enumerate accounts.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Principal, ServiceError> {
        let record = self
            .records
            .iter()
            .find(|r| r.congregation.username == username);

        match record {
            Some(r) if matches_hash(&Secret::new(password.to_string()), &r.password_hash) => {
                Ok(Principal::from_congregation(&r.congregation))
            }
            _ => Err(ServiceError::InvalidCredentials),
        }
    }

    /// Exact-match PIN check: returns true only when the identity belongs
    /// to the scope and the submitted PIN matches the stored hash. Every
    /// failure mode (malformed input, unknown scope, identity mismatch,
    /// wrong PIN) is a plain `false` with no hint about which part failed.
    pub fn validate_pin(&self, identity: &str, submitted: &str, scope: Uuid) -> bool {
        if !self.policy.is_well_formed(submitted) {
            return false;
        }
        let Some(record) = self.records.get(&scope) else {
            return false;
        };
        if record.congregation.username != identity {
            return false;
        }
        matches_hash(&Secret::new(submitted.to_string()), &record.pin_hash)
    }

    /// Rotate the PIN for a scope. Preconditions enforced here, before the
    /// stored hash is touched: current PIN matches, new PIN is well-formed,
    /// confirmation matches, and the new PIN differs from the current one.
    pub fn update_pin(
        &self,
        scope: Uuid,
        current: &str,
        new_pin: &str,
        confirm: &str,
    ) -> Result<(), ServiceError> {
        policy::validate_new_pin(&self.policy, new_pin, confirm)?;

        let mut record = self
            .records
            .get_mut(&scope)
            .ok_or(ServiceError::CongregationNotFound)?;

        if !matches_hash(&Secret::new(current.to_string()), &record.pin_hash) {
            return Err(ServiceError::CurrentPinIncorrect);
        }
        if matches_hash(&Secret::new(new_pin.to_string()), &record.pin_hash) {
            return Err(ServiceError::PolicyViolation(PolicyError::SecretReused));
        }

        record.pin_hash = hash_secret(&Secret::new(new_pin.to_string()))?;
        tracing::info!(scope = %scope, "PIN rotated");
        Ok(())
    }

    /// Rotate the password for a scope, same precondition shape as PINs.
    pub fn update_password(
        &self,
        scope: Uuid,
        current: &str,
        new_password: &str,
        confirm: &str,
    ) -> Result<(), ServiceError> {
        policy::validate_new_password(new_password, confirm)?;

        let mut record = self
            .records
            .get_mut(&scope)
            .ok_or(ServiceError::CongregationNotFound)?;

        if !matches_hash(&Secret::new(current.to_string()), &record.password_hash) {
            return Err(ServiceError::CurrentPasswordIncorrect);
        }
        if matches_hash(&Secret::new(new_password.to_string()), &record.password_hash) {
            return Err(ServiceError::PolicyViolation(PolicyError::SecretReused));
        }

        record.password_hash = hash_secret(&Secret::new(new_password.to_string()))?;
        tracing::info!(scope = %scope, "Password rotated");
        Ok(())
    }
}

#[async_trait]
impl CredentialValidator for CredentialStore {
    async fn validate(
        &self,
        identity: &str,
        submitted: &str,
        scope: Uuid,
    ) -> Result<bool, anyhow::Error> {
        Ok(self.validate_pin(identity, submitted, scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (CredentialStore, Uuid) {
        let id = Uuid::new_v4();
        let store = CredentialStore::seed(
            PinPolicy::default(),
            vec![SeedCredential {
                congregation: Congregation {
                    id,
                    name: "Emmanuel Congregation Ahinsan".to_string(),
                    username: "emmanuel".to_string(),
                    is_district: false,
                },
                password: "emmanuel123".to_string(),
                pin: "1234".to_string(),
            }],
        )
        .unwrap();
        (store, id)
    }

    #[test]
    fn validate_grants_only_on_exact_match() {
        let (store, scope) = store();

        assert!(store.validate_pin("emmanuel", "1234", scope));
        assert!(!store.validate_pin("emmanuel", "0000", scope));
        assert!(!store.validate_pin("emmanuel", "123", scope));
        assert!(!store.validate_pin("emmanuel", "", scope));
        assert!(!store.validate_pin("emmanuel", "12345", scope));
        assert!(!store.validate_pin("peniel", "1234", scope));
        assert!(!store.validate_pin("emmanuel", "1234", Uuid::new_v4()));
    }

    #[test]
    fn authenticate_hides_which_part_failed() {
        let (store, _) = store();

        assert!(store.authenticate("emmanuel", "emmanuel123").is_ok());

        let unknown = store.authenticate("nobody", "emmanuel123").unwrap_err();
        let wrong = store.authenticate("emmanuel", "wrong").unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[test]
    fn update_pin_rejects_reuse_before_touching_store() {
        let (store, scope) = store();

        let err = store.update_pin(scope, "1234", "1234", "1234").unwrap_err();
        assert!(matches!(
            err,
            ServiceError::PolicyViolation(PolicyError::SecretReused)
        ));
        // Store was never asked to persist a no-op change
        assert!(store.validate_pin("emmanuel", "1234", scope));
    }

    #[test]
    fn update_pin_requires_current_pin() {
        let (store, scope) = store();

        assert!(matches!(
            store.update_pin(scope, "0000", "5678", "5678"),
            Err(ServiceError::CurrentPinIncorrect)
        ));

        store.update_pin(scope, "1234", "5678", "5678").unwrap();
        assert!(!store.validate_pin("emmanuel", "1234", scope));
        assert!(store.validate_pin("emmanuel", "5678", scope));
    }

    #[test]
    fn update_password_enforces_minimum_length() {
        let (store, scope) = store();

        assert!(matches!(
            store.update_password(scope, "emmanuel123", "short", "short"),
            Err(ServiceError::PolicyViolation(
                PolicyError::PasswordTooShort { .. }
            ))
        ));

        store
            .update_password(scope, "emmanuel123", "newpassword", "newpassword")
            .unwrap();
        assert!(store.authenticate("emmanuel", "newpassword").is_ok());
        assert!(store.authenticate("emmanuel", "emmanuel123").is_err());
    }
}
