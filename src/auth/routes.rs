//! Authentication routes

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::handlers;
use super::middleware::require_auth;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /auth/apple` - Sign in with Apple (upsert by appleId)
/// - `POST /auth/google` - Sign in with Google (upsert by googleId)
/// - `POST /auth/register` - Email/password registration
/// - `POST /auth/login` - Email/password login
/// - `GET /me` - Current user profile (bearer token required)
/// - `GET /health` - Liveness check
pub fn auth_routes() -> Router {
    let protected = Router::new()
        .route("/me", get(handlers::me_handler))
        .route_layer(middleware::from_fn(require_auth));

    Router::new()
        .route("/auth/apple", post(handlers::apple_auth))
        .route("/auth/google", post(handlers::google_auth))
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/health", get(handlers::health))
        .merge(protected)
}
