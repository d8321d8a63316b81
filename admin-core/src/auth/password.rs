//! Password hashing
//!
//! Argon2id PHC strings. A stored value starting with
//! [`UNUSABLE_PASSWORD_PREFIX`] never verifies.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::UNUSABLE_PASSWORD_PREFIX;
use std::sync::OnceLock;

/// Hash of a random throwaway secret, computed on first use
static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

fn dummy_hash() -> Option<&'static str> {
    DUMMY_HASH
        .get_or_init(|| hash_password(make_unusable_password().as_str()).ok())
        .as_deref()
}

/// Hash password using argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::with_message(ErrorCode::PasswordHashFailed, e.to_string()))?;
    Ok(password_hash.to_string())
}

/// Verify a password against a stored hash
///
/// Unusable or malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    if stored.is_empty() || stored.starts_with(UNUSABLE_PASSWORD_PREFIX) {
        return false;
    }
    match PasswordHash::new(stored) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is malformed");
            false
        }
    }
}

/// Spend one full argon2 verification on a throwaway hash
///
/// Called when there is no stored credential to check, so a missing
/// account costs the same as a wrong password. Always `false`.
pub fn verify_dummy_password(password: &str) -> bool {
    match dummy_hash() {
        Some(hash) => {
            let _ = verify_password(password, hash);
        }
        None => tracing::warn!("Dummy password hash unavailable"),
    }
    false
}

/// A random credential that no password verifies against
pub fn make_unusable_password() -> String {
    let salt = SaltString::generate(&mut OsRng);
    format!("{}{}", UNUSABLE_PASSWORD_PREFIX, salt.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unusable_password_never_verifies() {
        let unusable = make_unusable_password();
        assert!(unusable.starts_with(UNUSABLE_PASSWORD_PREFIX));
        assert!(!verify_password("", &unusable));
        assert!(!verify_password(&unusable, &unusable));
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_dummy_hash_is_real_argon2() {
        let hash = dummy_hash().unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(PasswordHash::new(hash).is_ok());
        assert_eq!(dummy_hash(), Some(hash));
        assert!(!verify_dummy_password("pw"));
        assert!(!verify_dummy_password(""));
    }
}
