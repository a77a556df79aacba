//! Session token issuance and verification (HS256 JWT)

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tokens live for 30 days from issuance
pub const TOKEN_TTL_DAYS: i64 = 30;

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Claims {
    pub sub: String,
    #[serde(rename = "appleId", default, skip_serializing_if = "Option::is_none")]
    pub apple_id: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signature or format is invalid")]
    Invalid,

    #[error("token has expired")]
    Expired,

    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// Signs and verifies session tokens with one symmetric secret
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(TOKEN_TTL_DAYS),
        }
    }

    pub fn issue(&self, user_id: &str, apple_id: Option<&str>) -> Result<String, TokenError> {
        self.issue_at(user_id, apple_id, Utc::now())
    }

    /// Issues a token as if minted at `issued_at`
    pub fn issue_at(
        &self,
        user_id: &str,
        apple_id: Option<&str>,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id.to_string(),
            apple_id: apple_id.map(str::to_string),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Signing)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies the signature, then checks expiry against `now` with no leeway
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Invalid)?
            .claims;

        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_round_trip() {
        let tokens = TokenService::new("test_secret_key");
        let token = tokens.issue("U_TEST", Some("apple-123")).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "U_TEST");
        assert_eq!(claims.apple_id.as_deref(), Some("apple-123"));
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_DAYS * 24 * 60 * 60);
    }

    #[test]
    fn test_apple_id_claim_omitted_when_absent() {
        let tokens = TokenService::new("test_secret_key");
        let token = tokens.issue("U_TEST", None).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.apple_id, None);
    }

    #[test]
    fn test_validation_fails_with_wrong_secret() {
        let token = TokenService::new("test_secret_key")
            .issue("U_TEST", None)
            .unwrap();

        let result = TokenService::new("wrong_secret_key").verify(&token);
        assert!(matches!(result, Err(TokenError::Invalid)));
    }

    #[test]
    fn test_expiry_window() {
        let tokens = TokenService::new("test_secret_key");
        let issued_at = Utc::now();
        let token = tokens.issue_at("U_TEST", None, issued_at).unwrap();

        assert!(tokens
            .verify_at(&token, issued_at + Duration::days(29))
            .is_ok());
        assert!(matches!(
            tokens.verify_at(&token, issued_at + Duration::days(31)),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        let tokens = TokenService::new("test_secret_key");
        assert!(matches!(
            tokens.verify("not.a.jwt"),
            Err(TokenError::Invalid)
        ));
        assert!(matches!(tokens.verify(""), Err(TokenError::Invalid)));
    }
}
