// src/common/config.rs
//! Environment-supplied service configuration

use std::env;
use tracing::warn;

use crate::auth::passwords::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};

pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://minerva.db";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BCRYPT_COST: u32 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub port: u16,
    pub database_url: String,
    /// `None` mirrors the request origin back
    pub cors_origins: Option<Vec<String>>,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Self {
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ => {
                warn!("JWT_SECRET not set, falling back to the built-in development secret");
                DEFAULT_JWT_SECRET.to_string()
            }
        };

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .ok()
            .map(|raw| parse_origins(&raw))
            .filter(|origins| !origins.is_empty());

        let bcrypt_cost = parse_bcrypt_cost(env::var("BCRYPT_COST").ok().as_deref());

        Self {
            jwt_secret,
            port,
            database_url,
            cors_origins,
            bcrypt_cost,
        }
    }
}

/// Out-of-range or unparseable costs fall back to the default
fn parse_bcrypt_cost(raw: Option<&str>) -> u32 {
    raw.and_then(|c| c.trim().parse::<u32>().ok())
        .filter(|c| (MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(c))
        .unwrap_or(DEFAULT_BCRYPT_COST)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_skips_blanks() {
        let origins = parse_origins(" http://localhost:3000, ,https://app.example.com ");
        assert_eq!(
            origins,
            vec![
                "http://localhost:3000".to_string(),
                "https://app.example.com".to_string()
            ]
        );
    }

    #[test]
    fn test_parse_origins_empty() {
        assert!(parse_origins("").is_empty());
        assert!(parse_origins(" , ").is_empty());
    }

    #[test]
    fn test_bcrypt_cost_bounds() {
        assert_eq!(parse_bcrypt_cost(None), DEFAULT_BCRYPT_COST);
        assert_eq!(parse_bcrypt_cost(Some("4")), MIN_BCRYPT_COST);
        assert_eq!(parse_bcrypt_cost(Some("31")), MAX_BCRYPT_COST);
        assert_eq!(parse_bcrypt_cost(Some(" 12 ")), 12);
        assert_eq!(parse_bcrypt_cost(Some("3")), DEFAULT_BCRYPT_COST);
        assert_eq!(parse_bcrypt_cost(Some("32")), DEFAULT_BCRYPT_COST);
        assert_eq!(parse_bcrypt_cost(Some("fast")), DEFAULT_BCRYPT_COST);
    }
}
