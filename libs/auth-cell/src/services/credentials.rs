use std::sync::OnceLock;

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use regex::Regex;
use tracing::{instrument, warn};

use crate::models::AuthError;

pub struct CredentialService;

impl CredentialService {
    #[instrument(skip(password))]
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(password_hash.to_string())
    }

    /// A stored value that is not a valid PHC string never verifies.
    #[instrument(skip(password, hash))]
    pub fn verify_password(password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Stored credential is not a valid password hash: {}", e);
                return false;
            }
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    pub fn is_valid_email(email: &str) -> bool {
        static EMAIL: OnceLock<Regex> = OnceLock::new();
        EMAIL
            .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"))
            .is_match(email)
    }

    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }
}
