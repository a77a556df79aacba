//! # Auth Module
//!
//! Credential verification and session tokens for three identity sources:
//! - Sign in with Apple and Google (social handshake, upsert by external id)
//! - Email/password registration and login (bcrypt)
//! - HS256 session tokens valid for 30 days, checked by `require_auth`

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod passwords;
pub mod routes;
pub mod store;
pub mod tokens;
pub mod validators;


pub use middleware::{require_auth, AuthedUser};
pub use models::User;
pub use routes::auth_routes;
pub use store::{SqliteUserStore, StoreError, UserStore};
pub use tokens::{Claims, TokenService};
