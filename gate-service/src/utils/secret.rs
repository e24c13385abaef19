use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Newtype for a submitted secret (PIN or password) to prevent accidental
/// logging
#[derive(Debug, Clone)]
pub struct Secret(String);

impl Secret {
    pub fn new(secret: String) -> Self {
        Self(secret)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Newtype for a stored secret hash
#[derive(Debug, Clone)]
pub struct SecretHash(String);

impl SecretHash {
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Hash a secret using Argon2id with a random salt. Plaintext secrets
/// exist only transiently at this boundary.
pub fn hash_secret(secret: &Secret) -> Result<SecretHash, anyhow::Error> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    let hash = argon2
        .hash_password(secret.as_str().as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash secret: {}", e))?
        .to_string();

    Ok(SecretHash::new(hash))
}

/// Verify a secret against a stored hash.
///
/// Returns Ok(()) on match, Err otherwise.
pub fn verify_secret(secret: &Secret, hash: &SecretHash) -> Result<(), anyhow::Error> {
    let parsed_hash = PasswordHash::new(hash.as_str())
        .map_err(|e| anyhow::anyhow!("Invalid secret hash format: {}", e))?;

    Argon2::default()
        .verify_password(secret.as_str().as_bytes(), &parsed_hash)
        .map_err(|_| anyhow::anyhow!("Secret verification failed"))
}

/// Convenience wrapper returning a bool for exact-match checks.
pub fn matches_hash(secret: &Secret, hash: &SecretHash) -> bool {
    verify_secret(secret, hash).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let pin = Secret::new("1234".to_string());
        let hash = hash_secret(&pin).expect("Failed to hash secret");

        assert!(hash.as_str().starts_with("$argon2"));
        assert!(verify_secret(&pin, &hash).is_ok());
    }

    #[test]
    fn prefix_and_case_variants_do_not_match() {
        let hash = hash_secret(&Secret::new("1234".to_string())).unwrap();

        assert!(!matches_hash(&Secret::new("123".to_string()), &hash));
        assert!(!matches_hash(&Secret::new("12345".to_string()), &hash));
        assert!(!matches_hash(&Secret::new("".to_string()), &hash));

        let hash = hash_secret(&Secret::new("Secret123".to_string())).unwrap();
        assert!(!matches_hash(&Secret::new("secret123".to_string()), &hash));
    }

    #[test]
    fn same_secret_hashes_differently_per_salt() {
        let pin = Secret::new("4321".to_string());
        let h1 = hash_secret(&pin).unwrap();
        let h2 = hash_secret(&pin).unwrap();

        assert_ne!(h1.as_str(), h2.as_str());
        assert!(matches_hash(&pin, &h1));
        assert!(matches_hash(&pin, &h2));
    }
}
