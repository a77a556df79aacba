//! Client configuration

use std::env;
use std::path::PathBuf;

use crate::store::{EncryptedFileStore, StoreError};

/// Production auth service; release builds always talk to this
pub const PRODUCTION_API_URL: &str = "https://minerva-health-production.up.railway.app";

/// Secure-store key for the bearer token
pub const TOKEN_KEY: &str = "com.minervahealth.authToken";
/// Preferences key for the cached user profile JSON
pub const USER_KEY: &str = "com.minervahealth.authUser";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Base64 AES-256 key for [`crate::EncryptedFileStore`]
    pub secure_store_key: Option<String>,
}

impl ClientConfig {
    /// Debug builds honour `MINERVA_API_URL`; release builds ignore it.
    pub fn from_env() -> Self {
        Self::from_lookup(cfg!(debug_assertions), |name| env::var(name).ok())
    }

    fn from_lookup(allow_override: bool, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let override_url = if allow_override {
            lookup("MINERVA_API_URL").filter(|url| !url.trim().is_empty())
        } else {
            None
        };

        Self {
            base_url: override_url.unwrap_or_else(|| PRODUCTION_API_URL.to_string()),
            secure_store_key: lookup("MINERVA_SECURE_STORE_KEY")
                .filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            secure_store_key: None,
        }
    }

    pub fn with_secure_store_key(mut self, key: impl Into<String>) -> Self {
        self.secure_store_key = Some(key.into());
        self
    }

    /// Opens the token store under `dir` with the configured key
    pub async fn open_secure_store(
        &self,
        dir: impl Into<PathBuf>,
    ) -> Result<EncryptedFileStore, StoreError> {
        let key = self
            .secure_store_key
            .as_deref()
            .ok_or(StoreError::MissingKey)?;
        EncryptedFileStore::open(dir, key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encryption::EncryptionService;
    use crate::store::SecureStore;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_debug_build_honours_url_override() {
        let config = ClientConfig::from_lookup(
            true,
            lookup(&[("MINERVA_API_URL", "http://localhost:3000")]),
        );
        assert_eq!(config.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_blank_override_falls_back_to_production() {
        let config = ClientConfig::from_lookup(true, lookup(&[("MINERVA_API_URL", "   ")]));
        assert_eq!(config.base_url, PRODUCTION_API_URL);

        let config = ClientConfig::from_lookup(true, lookup(&[]));
        assert_eq!(config.base_url, PRODUCTION_API_URL);
    }

    #[test]
    fn test_release_build_ignores_override() {
        let config = ClientConfig::from_lookup(
            false,
            lookup(&[
                ("MINERVA_API_URL", "http://localhost:3000"),
                ("MINERVA_SECURE_STORE_KEY", "a2V5"),
            ]),
        );
        assert_eq!(config.base_url, PRODUCTION_API_URL);
        assert_eq!(config.secure_store_key.as_deref(), Some("a2V5"));
    }

    #[tokio::test]
    async fn test_open_secure_store_uses_configured_key() {
        let tmp = tempfile::tempdir().unwrap();

        let unkeyed = ClientConfig::with_base_url(PRODUCTION_API_URL);
        assert!(matches!(
            unkeyed.open_secure_store(tmp.path().join("secure")).await,
            Err(StoreError::MissingKey)
        ));

        let keyed = unkeyed.with_secure_store_key(EncryptionService::generate_key());
        let store = keyed.open_secure_store(tmp.path().join("secure")).await.unwrap();
        store.save(TOKEN_KEY, "tok-1").await.unwrap();

        let reopened = keyed.open_secure_store(tmp.path().join("secure")).await.unwrap();
        assert_eq!(reopened.load(TOKEN_KEY).await.unwrap().as_deref(), Some("tok-1"));
    }
}
