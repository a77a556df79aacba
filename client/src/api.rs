//! HTTPS/JSON transport to the auth service

use reqwest::{StatusCode, Url};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::models::{ApiErrorBody, AuthResponse, AuthUser};

const LOGIN_FALLBACK: &str = "Login failed";
const PROFILE_FALLBACK: &str = "Failed to fetch profile";

/// Thin client over the auth endpoints. No retries and no custom timeouts;
/// a failure is reported once.
#[derive(Debug, Clone)]
pub struct AuthApi {
    http: reqwest::Client,
    base_url: String,
}

impl AuthApi {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|_| ClientError::InvalidUrl)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            _ => Err(ClientError::InvalidUrl),
        }
    }

    /// POST a credential payload; 200/201 yield `{token, user}`
    pub async fn post_credentials<B>(&self, path: &str, body: &B) -> Result<AuthResponse, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        debug!(%url, "Sending credential request");

        let response = self.http.post(url).json(body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if status == StatusCode::OK || status == StatusCode::CREATED {
            return Ok(serde_json::from_slice(&bytes)?);
        }

        Err(api_error(status, &bytes, LOGIN_FALLBACK))
    }

    /// GET /me with the bearer token
    pub async fn fetch_profile(&self, token: &str) -> Result<AuthUser, ClientError> {
        let url = self.endpoint("/me")?;
        let response = self.http.get(url).bearer_auth(token).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if status == StatusCode::OK {
            return Ok(serde_json::from_slice(&bytes)?);
        }

        Err(api_error(status, &bytes, PROFILE_FALLBACK))
    }
}

fn api_error(status: StatusCode, body: &[u8], fallback: &str) -> ClientError {
    let message = serde_json::from_slice::<ApiErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| fallback.to_string());
    warn!(status = status.as_u16(), %message, "Auth service rejected request");

    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slashes_are_trimmed() {
        let api = AuthApi::new("https://api.example.com//");
        assert_eq!(api.base_url(), "https://api.example.com");
        assert_eq!(
            api.endpoint("/auth/login").unwrap().as_str(),
            "https://api.example.com/auth/login"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            AuthApi::new("not a url").endpoint("/auth/login"),
            Err(ClientError::InvalidUrl)
        ));
        assert!(matches!(
            AuthApi::new("ftp://files.example.com").endpoint("/auth/login"),
            Err(ClientError::InvalidUrl)
        ));
    }

    #[test]
    fn test_api_error_message() {
        let err = api_error(
            StatusCode::UNAUTHORIZED,
            br#"{"error":"Invalid email or password"}"#,
            LOGIN_FALLBACK,
        );
        assert_eq!(err.to_string(), "Invalid email or password");
        assert_eq!(err.status(), Some(401));

        let err = api_error(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>", LOGIN_FALLBACK);
        assert_eq!(err.to_string(), "Login failed");
    }
}
