//! Wire models for the backend API

use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /api/auth/google`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenExchangeRequest {
    pub access_token: String,
}

/// Successful response of `POST /api/auth/google`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenExchangeResponse {
    /// Backend-issued bearer token
    pub token: String,
    /// User record as the backend knows it
    #[serde(default)]
    pub user: BackendUser,
}

/// User object returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendUser {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Backends disagree on whether ids are strings or integers.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exchange_request_uses_camel_case() {
        let body = serde_json::to_value(TokenExchangeRequest {
            access_token: "abc".to_string(),
        })
        .unwrap();
        assert_eq!(body, json!({ "accessToken": "abc" }));
    }

    #[test]
    fn test_backend_user_accepts_numeric_id() {
        let response: TokenExchangeResponse = serde_json::from_value(json!({
            "token": "t",
            "user": { "id": 42, "email": "a@b.com", "role": "admin" }
        }))
        .unwrap();

        assert_eq!(response.user.id.as_deref(), Some("42"));
        assert_eq!(response.user.email.as_deref(), Some("a@b.com"));
        assert_eq!(response.user.name, None);
    }

    #[test]
    fn test_exchange_response_without_user() {
        let response: TokenExchangeResponse =
            serde_json::from_value(json!({ "token": "t" })).unwrap();
        assert_eq!(response.user, BackendUser::default());
    }
}
