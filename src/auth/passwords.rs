//! Password hashing (bcrypt), run off the async executor

use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Work-factor bounds accepted by bcrypt
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("bcrypt failure: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Salted bcrypt hash at `cost`
pub async fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    let password = password.to_string();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

/// Constant-time comparison is provided by `bcrypt::verify`.
/// A stored hash that fails to parse counts as a mismatch.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let password = password.to_string();
    let hash = hash.to_string();
    let matches = tokio::task::spawn_blocking(move || {
        bcrypt::verify(password, &hash).unwrap_or(false)
    })
    .await?;
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_then_verify() {
        let hash = hash_password("goodpass1", MIN_BCRYPT_COST).await.unwrap();
        assert_ne!(hash, "goodpass1");
        assert!(verify_password("goodpass1", &hash).await.unwrap());
        assert!(!verify_password("badpass11", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_hashes_are_salted() {
        let a = hash_password("goodpass1", MIN_BCRYPT_COST).await.unwrap();
        let b = hash_password("goodpass1", MIN_BCRYPT_COST).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_corrupt_hash_is_a_mismatch() {
        assert!(!verify_password("goodpass1", "not-a-bcrypt-hash").await.unwrap());
    }
}
