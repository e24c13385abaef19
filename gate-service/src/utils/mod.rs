pub mod secret;
pub mod validation;

pub use secret::{hash_secret, matches_hash, verify_secret, Secret, SecretHash};
pub use validation::ValidatedJson;
