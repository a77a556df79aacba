//! Wire and cache models shared with the auth service

use serde::{Deserialize, Serialize};

/// Cached user profile; also the `user` object in auth responses
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub apple_id: Option<String>,
    #[serde(default)]
    pub google_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponse {
    pub token: String,
    pub user: AuthUser,
}

/// `{error}` body of every failed request
#[derive(Deserialize, Debug)]
pub struct ApiErrorBody {
    pub error: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AppleLoginBody<'a> {
    pub apple_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_token: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginBody<'a> {
    pub google_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
}

#[derive(Serialize)]
pub struct EmailLoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub struct RegisterBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_auth_user_tolerates_missing_and_extra_fields() {
        let user: AuthUser = serde_json::from_value(json!({
            "id": "U_1",
            "email": "x@y.com",
            "updatedAt": "2025-01-01T00:00:00.000Z",
        }))
        .unwrap();

        assert_eq!(user.id, "U_1");
        assert_eq!(user.email.as_deref(), Some("x@y.com"));
        assert_eq!(user.apple_id, None);
        assert_eq!(user.created_at, None);
    }

    #[test]
    fn test_optional_fields_are_omitted_from_bodies() {
        let body = serde_json::to_value(AppleLoginBody {
            apple_id: "001234.abcd",
            identity_token: None,
            email: None,
            name: Some("Ada"),
        })
        .unwrap();
        assert_eq!(body, json!({ "appleId": "001234.abcd", "name": "Ada" }));

        let body = serde_json::to_value(RegisterBody {
            email: "x@y.com",
            password: "goodpass1",
            name: None,
        })
        .unwrap();
        assert_eq!(body, json!({ "email": "x@y.com", "password": "goodpass1" }));
    }
}
