// src/auth/validators.rs

use super::models::{LoginRequest, RegisterRequest, SocialLogin};
use super::passwords::MIN_PASSWORD_LENGTH;
use crate::common::{ValidationResult, Validator};

// ============================================================================
// Credential Validators
// ============================================================================

pub struct SocialLoginValidator;

impl Validator<SocialLogin> for SocialLoginValidator {
    fn validate(&self, data: &SocialLogin) -> ValidationResult {
        let mut result = ValidationResult::new();
        let field = data.provider.field();

        if data
            .external_id
            .as_deref()
            .map_or(true, |id| id.trim().is_empty())
        {
            result.add_error(format!("{} is required", field));
        }

        result
    }
}

pub struct RegisterValidator;

impl Validator<RegisterRequest> for RegisterValidator {
    fn validate(&self, data: &RegisterRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.merge(validate_email(data.email.as_deref()));

        let password_len = data.password.as_deref().map_or(0, |p| p.chars().count());
        if password_len < MIN_PASSWORD_LENGTH {
            result.add_error("Password must be at least 8 characters");
        }

        result
    }
}

pub struct LoginValidator;

impl Validator<LoginRequest> for LoginValidator {
    fn validate(&self, data: &LoginRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.email.as_deref().map_or(true, |e| e.trim().is_empty()) {
            result.add_error("Email is required");
        }

        if data.password.as_deref().map_or(true, str::is_empty) {
            result.add_error("Password is required");
        }

        result
    }
}

/// Presence plus a minimal `local@domain` shape check
fn validate_email(email: Option<&str>) -> ValidationResult {
    let mut result = ValidationResult::new();

    let email = match email.map(str::trim) {
        Some(e) if !e.is_empty() => e,
        _ => {
            result.add_error("Email is required");
            return result;
        }
    };

    let mut parts = email.split('@');
    let well_formed = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(local), Some(domain), None)
            if !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace)
    );
    if !well_formed {
        result.add_error("Email is invalid");
    }

    result
}
