// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use tracing::error;

use super::validation::ValidationResult;
use crate::auth::store::StoreError;

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";
pub const EMAIL_TAKEN: &str = "An account with this email already exists";

/// API error types
///
/// `Internal` keeps its detail out of the response body; only the public
/// message is serialized.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Conflict(String),
    NotFound(String),
    Internal {
        message: &'static str,
        detail: String,
    },
}

impl ApiError {
    /// Logs `detail` and returns a 500 carrying only `message`
    pub fn internal(message: &'static str, detail: impl fmt::Display) -> Self {
        let detail = detail.to_string();
        error!(error = %detail, public_message = message, "Internal error while handling request");
        ApiError::Internal { message, detail }
    }

    /// Maps a store failure, keeping uniqueness conflicts on the 409 path
    pub fn from_store(err: StoreError, message: &'static str) -> Self {
        match err {
            StoreError::DuplicateEmail => ApiError::Conflict(EMAIL_TAKEN.to_string()),
            other => ApiError::internal(message, other),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::Internal { message, detail } => {
                write!(f, "Internal Server Error: {} ({})", message, detail)
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let error_message = match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Conflict(msg)
            | ApiError::NotFound(msg) => msg,
            ApiError::Internal { message, .. } => message.to_string(),
        };

        (status, Json(ErrorResponse { error: error_message })).into_response()
    }
}

/// Converts a failed ValidationResult into a 400 naming the first problem
impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        match result.errors.into_iter().next() {
            Some(first) => ApiError::BadRequest(first),
            None => ApiError::internal(
                "Request could not be processed",
                "validation result was valid but converted to error",
            ),
        }
    }
}
