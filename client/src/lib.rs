//! # Minerva client session
//!
//! Device-side half of Minerva authentication: the [`SessionManager`] owns
//! the "is this device logged in" state, talks to the auth service over
//! HTTPS/JSON, keeps the bearer token in a [`SecureStore`] and the cached
//! profile in a separate [`Preferences`] store.

pub mod api;
pub mod config;
pub mod encryption;
pub mod error;
pub mod models;
pub mod session;
pub mod store;

pub use api::AuthApi;
pub use config::{ClientConfig, TOKEN_KEY, USER_KEY};
pub use error::ClientError;
pub use models::{AuthResponse, AuthUser};
pub use session::{SessionManager, SessionState};
pub use store::{
    EncryptedFileStore, JsonFilePreferences, MemoryPreferences, MemorySecureStore, Preferences,
    SecureStore, StoreError,
};
