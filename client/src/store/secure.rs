//! Secure token storage

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{SecureStore, StoreError};
use crate::encryption::EncryptionService;

/// One AES-256-GCM sealed file per logical key.
///
/// Each entry is bound to its key as associated data, so files cannot be
/// swapped between keys. Losing the encryption key turns every entry into
/// `None` rather than an error.
#[derive(Debug)]
pub struct EncryptedFileStore {
    dir: PathBuf,
    cipher: EncryptionService,
    write_lock: Mutex<()>,
}

impl EncryptedFileStore {
    pub async fn open(dir: impl Into<PathBuf>, key: &str) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        restrict_permissions(&dir, 0o700).await?;

        Ok(Self {
            dir,
            cipher: EncryptionService::from_key(key)?,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.sealed", file_name))
    }

    async fn remove_entry(path: &Path) -> Result<(), StoreError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path, mode: u32) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path, _mode: u32) -> Result<(), StoreError> {
    Ok(())
}

#[async_trait]
impl SecureStore for EncryptedFileStore {
    async fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let sealed = self.cipher.seal(key, value)?;
        let path = self.entry_path(key);
        let staging = path.with_extension("sealed.tmp");

        let _guard = self.write_lock.lock().await;
        Self::remove_entry(&path).await?;
        tokio::fs::write(&staging, sealed).await?;
        restrict_permissions(&staging, 0o600).await?;
        tokio::fs::rename(&staging, &path).await?;

        debug!(key, "Secure entry saved");
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let sealed = match tokio::fs::read_to_string(self.entry_path(key)).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match self.cipher.open(key, &sealed) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "Secure entry unreadable, treating as absent");
                Ok(None)
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        Self::remove_entry(&self.entry_path(key)).await?;
        debug!(key, "Secure entry deleted");
        Ok(())
    }
}

/// In-process secure store for tests and previews
#[derive(Debug, Default)]
pub struct MemorySecureStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySecureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl SecureStore for MemorySecureStore {
    async fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        entries.remove(key);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TOKEN_KEY;

    async fn file_store(dir: &Path, key: &str) -> EncryptedFileStore {
        EncryptedFileStore::open(dir.join("secure"), key).await.unwrap()
    }

    fn entries_in(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[tokio::test]
    async fn test_save_load_delete() {
        let tmp = tempfile::tempdir().unwrap();
        let store = file_store(tmp.path(), &EncryptionService::generate_key()).await;

        assert_eq!(store.load(TOKEN_KEY).await.unwrap(), None);

        store.save(TOKEN_KEY, "token-1").await.unwrap();
        assert_eq!(store.load(TOKEN_KEY).await.unwrap().as_deref(), Some("token-1"));

        store.delete(TOKEN_KEY).await.unwrap();
        assert_eq!(store.load(TOKEN_KEY).await.unwrap(), None);

        // Deleting an absent entry is not an error
        store.delete(TOKEN_KEY).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_replaces_without_leftovers() {
        let tmp = tempfile::tempdir().unwrap();
        let store = file_store(tmp.path(), &EncryptionService::generate_key()).await;

        store.save(TOKEN_KEY, "token-1").await.unwrap();
        store.save(TOKEN_KEY, "token-2").await.unwrap();

        assert_eq!(store.load(TOKEN_KEY).await.unwrap().as_deref(), Some("token-2"));
        assert_eq!(entries_in(store.dir()).len(), 1);
    }

    #[tokio::test]
    async fn test_plaintext_not_on_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let store = file_store(tmp.path(), &EncryptionService::generate_key()).await;

        store.save(TOKEN_KEY, "very-secret-token").await.unwrap();

        let name = &entries_in(store.dir())[0];
        let raw = std::fs::read_to_string(store.dir().join(name)).unwrap();
        assert!(!raw.contains("very-secret-token"));
    }

    #[tokio::test]
    async fn test_lost_key_reads_as_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let original = file_store(tmp.path(), &EncryptionService::generate_key()).await;
        original.save(TOKEN_KEY, "token-1").await.unwrap();

        let rekeyed = file_store(tmp.path(), &EncryptionService::generate_key()).await;
        assert_eq!(rekeyed.load(TOKEN_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_persists_across_instances() {
        let tmp = tempfile::tempdir().unwrap();
        let key = EncryptionService::generate_key();

        file_store(tmp.path(), &key)
            .await
            .save(TOKEN_KEY, "token-1")
            .await
            .unwrap();

        let reopened = file_store(tmp.path(), &key).await;
        assert_eq!(reopened.load(TOKEN_KEY).await.unwrap().as_deref(), Some("token-1"));
    }

    #[tokio::test]
    async fn test_memory_store_overwrites() {
        let store = MemorySecureStore::new();
        store.save(TOKEN_KEY, "a").await.unwrap();
        store.save(TOKEN_KEY, "b").await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.load(TOKEN_KEY).await.unwrap().as_deref(), Some("b"));

        store.delete(TOKEN_KEY).await.unwrap();
        assert!(store.is_empty().await);
    }
}
