//! Client error types
//!
//! The Display text of each variant is what ends up in
//! `SessionState::error_message`.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid server URL")]
    InvalidUrl,

    /// Rejected locally before any request was sent
    #[error("{0}")]
    Precondition(&'static str),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status; `message` comes from the `{error}` body when present
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Unexpected server response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Local storage failure: {0}")]
    Store(#[from] StoreError),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
