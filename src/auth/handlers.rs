//! Authentication handlers

use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::middleware::AuthedUser;
use super::models::{
    AppleAuthRequest, AuthResponse, GoogleAuthRequest, LoginRequest, ProfileResponse,
    RegisterRequest, SocialLogin, User, UserResponse,
};
use super::passwords::{hash_password, verify_password};
use super::validators::{LoginValidator, RegisterValidator, SocialLoginValidator};
use crate::common::error::{EMAIL_TAKEN, INVALID_CREDENTIALS};
use crate::common::helpers::non_blank;
use crate::common::{normalize_email, safe_email_log, ApiError, AppState, Validator};

pub const INVALID_BODY: &str = "Invalid request body";

const SOCIAL_FAILURE: &str = "Authentication failed";
const REGISTER_FAILURE: &str = "Registration failed";
const LOGIN_FAILURE: &str = "Login failed";
const PROFILE_FAILURE: &str = "Failed to fetch user";

/// Unwraps a JSON body, answering 400 instead of axum's default 422
fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        debug!(reason = %rejection.body_text(), "Rejected request body");
        ApiError::BadRequest(INVALID_BODY.to_string())
    })
}

fn auth_response(
    state: &AppState,
    user: &User,
    failure: &'static str,
) -> Result<AuthResponse, ApiError> {
    let token = state
        .tokens
        .issue(&user.id, user.apple_id.as_deref())
        .map_err(|e| ApiError::internal(failure, e))?;

    Ok(AuthResponse {
        token,
        user: UserResponse::from(user),
    })
}

/// POST /auth/apple
/// Sign in with Apple: upsert by `appleId`, always 200 with a fresh token
///
/// # Request Body
/// ```json
/// { "appleId": "001234.abcd", "email": "a@b.com", "name": "Ada" }
/// ```
pub async fn apple_auth(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<AppleAuthRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let request = parse_body(payload)?;
    if request.identity_token.is_some() {
        debug!("Apple identity token supplied; it is not verified server-side");
    }
    social_login(&state, request.into()).await.map(Json)
}

/// POST /auth/google
/// Sign in with Google: upsert by `googleId`, always 200 with a fresh token
pub async fn google_auth(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<GoogleAuthRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let request = parse_body(payload)?;
    social_login(&state, request.into()).await.map(Json)
}

async fn social_login(state: &AppState, login: SocialLogin) -> Result<AuthResponse, ApiError> {
    SocialLoginValidator.validate(&login).into_result()?;

    let provider = login.provider;
    let external_id = login.external_id.unwrap_or_default();
    let email = non_blank(login.email.as_deref()).map(|e| normalize_email(&e));
    let name = non_blank(login.name.as_deref());

    let user = state
        .store
        .upsert_social(provider, &external_id, email.as_deref(), name.as_deref())
        .await
        .map_err(|e| ApiError::from_store(e, SOCIAL_FAILURE))?;

    info!(
        user_id = %user.id,
        provider = provider.as_str(),
        "User authenticated via social handshake"
    );

    auth_response(state, &user, SOCIAL_FAILURE)
}

/// POST /auth/register
/// Creates an email/password account and answers 201 with a token
pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let request = parse_body(payload)?;
    RegisterValidator.validate(&request).into_result()?;

    let email = normalize_email(request.email.as_deref().unwrap_or_default());
    let password = request.password.unwrap_or_default();
    let name = non_blank(request.name.as_deref());

    let existing = state
        .store
        .find_by_email(&email)
        .await
        .map_err(|e| ApiError::from_store(e, REGISTER_FAILURE))?;
    if existing.is_some() {
        warn!(email = %safe_email_log(&email), "Registration rejected: email already registered");
        return Err(ApiError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let password_hash = hash_password(&password, state.password_cost)
        .await
        .map_err(|e| ApiError::internal(REGISTER_FAILURE, e))?;

    // A concurrent registration can still win the race; the constraint
    // surfaces it as DuplicateEmail -> 409.
    let user = state
        .store
        .create_email_user(&email, &password_hash, name.as_deref())
        .await
        .map_err(|e| ApiError::from_store(e, REGISTER_FAILURE))?;

    info!(user_id = %user.id, email = %safe_email_log(&email), "New email account registered");

    let response = auth_response(&state, &user, REGISTER_FAILURE)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /auth/login
/// Unknown email, social-only account and wrong password all produce the
/// same 401 body.
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let request = parse_body(payload)?;
    LoginValidator.validate(&request).into_result()?;

    let email = normalize_email(request.email.as_deref().unwrap_or_default());
    let password = request.password.unwrap_or_default();

    let user = state
        .store
        .find_by_email(&email)
        .await
        .map_err(|e| ApiError::from_store(e, LOGIN_FAILURE))?;

    let Some((user, stored_hash)) =
        user.and_then(|u| u.password_hash.clone().map(|hash| (u, hash)))
    else {
        debug!(email = %safe_email_log(&email), "Login rejected: no password account");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    let matches = verify_password(&password, &stored_hash)
        .await
        .map_err(|e| ApiError::internal(LOGIN_FAILURE, e))?;
    if !matches {
        debug!(user_id = %user.id, "Login rejected: password mismatch");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    info!(user_id = %user.id, "User logged in with email and password");

    auth_response(&state, &user, LOGIN_FAILURE).map(Json)
}

/// GET /me
/// Returns the public profile of the token's subject
pub async fn me_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(authed): Extension<AuthedUser>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = state
        .store
        .find_by_id(&authed.id)
        .await
        .map_err(|e| ApiError::from_store(e, PROFILE_FAILURE))?;

    match user {
        Some(user) => Ok(Json(ProfileResponse::from(user))),
        None => {
            warn!(user_id = %authed.id, "Token subject no longer exists");
            Err(ApiError::NotFound("User not found".to_string()))
        }
    }
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "minerva-backend",
    }))
}
