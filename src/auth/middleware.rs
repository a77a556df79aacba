//! Bearer-token middleware for protected routes

use axum::{
    extract::{Extension, Request},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::common::{safe_token_log, ApiError, AppState};

pub const MISSING_AUTH_HEADER: &str = "Missing or invalid authorization header";
pub const INVALID_TOKEN: &str = "Invalid or expired token";

/// Identity decoded from a verified token, forwarded to handlers as a
/// request extension. Handlers trust it without re-verifying.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Rejects with 401 before the handler (and therefore the store) is reached
/// unless the request carries a valid, unexpired bearer token.
pub async fn require_auth(
    Extension(state): Extension<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = match bearer_token(request.headers()) {
        Some(token) => token.to_string(),
        None => {
            warn!(uri = %request.uri(), "Authentication failed: missing or malformed Authorization header");
            return Err(ApiError::Unauthorized(MISSING_AUTH_HEADER.to_string()));
        }
    };

    let claims = state.tokens.verify(&token).map_err(|e| {
        warn!(error = %e, token = %safe_token_log(&token), "Bearer token rejected");
        ApiError::Unauthorized(INVALID_TOKEN.to_string())
    })?;

    debug!(user_id = %claims.sub, "Bearer token accepted");

    request.extensions_mut().insert(AuthedUser {
        id: claims.sub,
    });

    Ok(next.run(request).await)
}
