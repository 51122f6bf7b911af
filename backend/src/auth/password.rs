//! Password hashing using argon2
//!
//! Argon2 is intentionally CPU-intensive, so the public API hands the
//! work to the blocking thread pool instead of stalling the runtime.
//! Hashes are stored as Argon2id PHC strings.

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

fn hash_blocking(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

fn verify_blocking(password: &str, hash: &str) -> Result<bool> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Password hashing service
pub struct PasswordService;

impl PasswordService {
    /// Hash a password on the blocking thread pool
    pub async fn hash_async(password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || hash_blocking(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Check a password against a stored hash on the blocking pool
    ///
    /// A malformed stored hash is an error, not a failed verification.
    pub async fn verify_async(password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || verify_blocking(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "home-cook-passphrase";
        let hash = hash_blocking(password).unwrap();

        assert!(verify_blocking(password, &hash).unwrap());
        assert!(!verify_blocking("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_salts_make_hashes_unique() {
        let password = "repeatable-input";
        let hash1 = hash_blocking(password).unwrap();
        let hash2 = hash_blocking(password).unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_blocking(password, &hash1).unwrap());
        assert!(verify_blocking(password, &hash2).unwrap());
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(verify_blocking("anything", "not-a-phc-string").is_err());
    }

    #[tokio::test]
    async fn test_async_hash_and_verify() {
        let password = "async-passphrase".to_string();
        let hash = PasswordService::hash_async(password.clone()).await.unwrap();

        assert!(PasswordService::verify_async(password.clone(), hash.clone())
            .await
            .unwrap());
        assert!(!PasswordService::verify_async("wrong".to_string(), hash)
            .await
            .unwrap());
    }
}
