//! One-way password hashing with Argon2id.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::rngs::OsRng;

use crate::error::AppError;

/// Hashes `plaintext` with a fresh random salt, returning a PHC string.
///
/// Runs on the blocking pool; Argon2 is deliberately CPU-heavy.
pub async fn hash(plaintext: &str) -> Result<String, AppError> {
    let plaintext = plaintext.to_owned();
    tokio::task::spawn_blocking(move || hash_blocking(&plaintext)).await?
}

/// Checks `plaintext` against a stored hash. A mismatch is `Ok(false)`.
pub async fn verify(plaintext: &str, digest: &str) -> Result<bool, AppError> {
    let plaintext = plaintext.to_owned();
    let digest = digest.to_owned();
    tokio::task::spawn_blocking(move || verify_blocking(&plaintext, &digest)).await?
}

fn hash_blocking(plaintext: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalError(format!("failed to hash password: {e}")))
}

fn verify_blocking(plaintext: &str, digest: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(digest)
        .map_err(|e| AppError::InternalError(format!("stored password hash is malformed: {e}")))?;
    Ok(Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_is_salted_and_verifiable() {
        let first = hash("pw123").await.unwrap();
        let second = hash("pw123").await.unwrap();

        assert_ne!(first, "pw123");
        assert_ne!(first, second);
        assert_eq!(first.len(), second.len());
        assert!(first.starts_with("$argon2id$"));

        assert!(verify("pw123", &first).await.unwrap());
        assert!(verify("pw123", &second).await.unwrap());
    }

    #[tokio::test]
    async fn test_mismatch_is_not_an_error() {
        let digest = hash("pw123").await.unwrap();
        assert!(!verify("wrong", &digest).await.unwrap());
        assert!(!verify("", &digest).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_digest_is_fatal() {
        let result = verify("pw123", "pw123").await;
        assert!(matches!(result, Err(AppError::InternalError(_))));
    }
}
