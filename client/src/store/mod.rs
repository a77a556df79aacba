//! Device-local persistence
//!
//! Two deliberately separate abstractions: [`SecureStore`] holds the bearer
//! token with at-rest protection, [`Preferences`] holds display-only data
//! such as the cached profile.

use async_trait::async_trait;
use thiserror::Error;

use crate::encryption::EncryptionError;

pub mod preferences;
pub mod secure;

pub use preferences::{JsonFilePreferences, MemoryPreferences};
pub use secure::{EncryptedFileStore, MemorySecureStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encryption error: {0}")]
    Encryption(#[from] EncryptionError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("secure store key is not configured")]
    MissingKey,
}

/// Credential store addressed by a fixed logical key.
///
/// `save` replaces any existing entry; a reader never observes two values
/// for one key. A lost or unreadable entry loads as `None`.
#[async_trait]
pub trait SecureStore: Send + Sync {
    async fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// General key/value store for non-secret data
#[async_trait]
pub trait Preferences: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
