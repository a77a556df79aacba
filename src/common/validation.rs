// Request validation shared by the auth handlers
//
// Validators collect every problem they find; the HTTP layer reports only the
// first one, so check order decides which message a client sees.

/// Client-facing messages, in the order the checks ran
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.is_valid = false;
        self.errors.push(message.into());
    }

    /// Appends `other`'s errors after this result's own
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.is_valid {
            self.is_valid = false;
            self.errors.extend(other.errors);
        }
    }

    pub fn first_message(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }

    /// `Ok(())` when valid, otherwise the result itself as the error
    pub fn into_result(self) -> Result<(), ValidationResult> {
        if self.is_valid {
            Ok(())
        } else {
            Err(self)
        }
    }
}

pub trait Validator<T> {
    fn validate(&self, data: &T) -> ValidationResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_order() {
        let mut result = ValidationResult::new();
        result.add_error("Email is required");

        let mut password = ValidationResult::new();
        password.add_error("Password is required");
        result.merge(password);
        result.merge(ValidationResult::new());

        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[1], "Password is required");
        assert_eq!(result.first_message(), Some("Email is required"));
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationResult::new().into_result().is_ok());

        let mut failed = ValidationResult::new();
        failed.add_error("appleId is required");
        let err = failed.into_result().unwrap_err();
        assert_eq!(err.first_message(), Some("appleId is required"));
    }
}
