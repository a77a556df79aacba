//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User database model
///
/// Deliberately not `Serialize`: responses go through [`UserResponse`] or
/// [`ProfileResponse`] so `password_hash` can never reach the wire.
#[derive(FromRow, Debug, Clone)]
pub struct User {
    pub id: String,
    pub apple_id: Option<String>,
    pub google_id: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// External identity sources for the social handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityProvider {
    Apple,
    Google,
}

impl IdentityProvider {
    /// Column holding this provider's external id
    pub fn column(&self) -> &'static str {
        match self {
            IdentityProvider::Apple => "apple_id",
            IdentityProvider::Google => "google_id",
        }
    }

    /// JSON field carrying the external id in request bodies
    pub fn field(&self) -> &'static str {
        match self {
            IdentityProvider::Apple => "appleId",
            IdentityProvider::Google => "googleId",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityProvider::Apple => "apple",
            IdentityProvider::Google => "google",
        }
    }
}

/// POST /auth/apple body
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AppleAuthRequest {
    pub apple_id: Option<String>,
    /// Accepted but not verified against Apple's keys
    pub identity_token: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// POST /auth/google body
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthRequest {
    pub google_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Provider-neutral view of a social handshake request
#[derive(Debug)]
pub struct SocialLogin {
    pub provider: IdentityProvider,
    pub external_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl From<AppleAuthRequest> for SocialLogin {
    fn from(req: AppleAuthRequest) -> Self {
        Self {
            provider: IdentityProvider::Apple,
            external_id: req.apple_id,
            email: req.email,
            name: req.name,
        }
    }
}

impl From<GoogleAuthRequest> for SocialLogin {
    fn from(req: GoogleAuthRequest) -> Self {
        Self {
            provider: IdentityProvider::Google,
            external_id: req.google_id,
            email: req.email,
            name: req.name,
        }
    }
}

/// POST /auth/register body
#[derive(Deserialize, Default)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// POST /auth/login body
#[derive(Deserialize, Default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// User projection embedded in every auth response
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub apple_id: Option<String>,
    pub google_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            apple_id: user.apple_id.clone(),
            google_id: user.google_id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            created_at: user.created_at.clone(),
        }
    }
}

/// `{token, user}` returned by every credential endpoint
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// GET /me body
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub apple_id: Option<String>,
    pub google_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            apple_id: user.apple_id,
            google_id: user.google_id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
