//! User store: the persistence seam behind every auth handler

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;

use super::models::{IdentityProvider, User};
use crate::common::generate_user_id;

const USER_COLUMNS: &str =
    "id, apple_id, google_id, email, password_hash, name, created_at, updated_at";

#[derive(Debug, Error)]
pub enum StoreError {
    /// The email uniqueness constraint rejected a write
    #[error("email already belongs to another account")]
    DuplicateEmail,

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

/// Persistence operations the auth service needs.
///
/// Implementations must enforce uniqueness of `apple_id`, `google_id` and
/// case-insensitive `email` themselves; handlers rely on the store to be the
/// final arbiter under concurrent writes.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// `email` must already be normalized
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Create-if-absent keyed on the provider's external id. When the user
    /// exists, a supplied `email`/`name` overwrites the stored value and an
    /// absent one leaves it untouched.
    async fn upsert_social(
        &self,
        provider: IdentityProvider,
        external_id: &str,
        email: Option<&str>,
        name: Option<&str>,
    ) -> Result<User, StoreError>;

    async fn create_email_user(
        &self,
        email: &str,
        password_hash: &str,
        name: Option<&str>,
    ) -> Result<User, StoreError>;
}

/// SQLite-backed [`UserStore`]
#[derive(Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn map_db_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() && db_err.message().contains("users.email") {
            return StoreError::DuplicateEmail;
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)
    }

    async fn upsert_social(
        &self,
        provider: IdentityProvider,
        external_id: &str,
        email: Option<&str>,
        name: Option<&str>,
    ) -> Result<User, StoreError> {
        let column = provider.column();
        let now = now_timestamp();

        // Single statement so concurrent first logins converge on one row.
        let sql = format!(
            r#"
            INSERT INTO users (id, {column}, email, name, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT({column}) DO UPDATE SET
                email = COALESCE(excluded.email, users.email),
                name = COALESCE(excluded.name, users.name),
                updated_at = CASE
                    WHEN excluded.email IS NULL AND excluded.name IS NULL THEN users.updated_at
                    ELSE excluded.updated_at
                END
            RETURNING {USER_COLUMNS}
            "#
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(generate_user_id())
            .bind(external_id)
            .bind(email)
            .bind(name)
            .bind(&now)
            .bind(&now)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        debug!(
            user_id = %user.id,
            provider = provider.as_str(),
            created = user.created_at == now,
            "Social identity upserted"
        );

        Ok(user)
    }

    async fn create_email_user(
        &self,
        email: &str,
        password_hash: &str,
        name: Option<&str>,
    ) -> Result<User, StoreError> {
        let now = now_timestamp();
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, password_hash, name, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(generate_user_id())
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::db;

    async fn store() -> SqliteUserStore {
        let pool = db::connect("sqlite::memory:").await.expect("in-memory db");
        SqliteUserStore::new(pool)
    }

    #[tokio::test]
    async fn test_upsert_social_creates_then_updates_same_row() {
        let store = store().await;

        let first = store
            .upsert_social(IdentityProvider::Apple, "apple-001", Some("a@b.com"), None)
            .await
            .unwrap();
        let second = store
            .upsert_social(IdentityProvider::Apple, "apple-001", Some("c@d.com"), Some("Ada"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.email.as_deref(), Some("c@d.com"));
        assert_eq!(second.name.as_deref(), Some("Ada"));
        assert_eq!(second.apple_id.as_deref(), Some("apple-001"));
    }

    #[tokio::test]
    async fn test_upsert_social_keeps_fields_when_absent() {
        let store = store().await;

        store
            .upsert_social(IdentityProvider::Google, "g-1", Some("g@b.com"), Some("Grace"))
            .await
            .unwrap();
        let again = store
            .upsert_social(IdentityProvider::Google, "g-1", None, None)
            .await
            .unwrap();

        assert_eq!(again.email.as_deref(), Some("g@b.com"));
        assert_eq!(again.name.as_deref(), Some("Grace"));
    }

    #[tokio::test]
    async fn test_apple_and_google_ids_are_separate_namespaces() {
        let store = store().await;

        let apple = store
            .upsert_social(IdentityProvider::Apple, "same-id", None, None)
            .await
            .unwrap();
        let google = store
            .upsert_social(IdentityProvider::Google, "same-id", None, None)
            .await
            .unwrap();

        assert_ne!(apple.id, google.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected_by_constraint() {
        let store = store().await;

        store
            .create_email_user("x@y.com", "hash", None)
            .await
            .unwrap();
        let err = store
            .create_email_user("X@Y.COM", "hash", None)
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_find_by_email_and_id() {
        let store = store().await;

        let created = store
            .create_email_user("x@y.com", "hash", Some("Xavier"))
            .await
            .unwrap();

        let by_email = store.find_by_email("x@y.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);
        assert_eq!(by_email.password_hash.as_deref(), Some("hash"));

        let by_id = store.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id.name.as_deref(), Some("Xavier"));

        assert!(store.find_by_id("U_MISSING").await.unwrap().is_none());
        assert!(store.find_by_email("nobody@y.com").await.unwrap().is_none());
    }
}
