//! Custom error types for the web service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Sign-in failures reported back to the login page through `?error=`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInError {
    OAuthSignin,
    OAuthCallback,
    OAuthCreateAccount,
    EmailCreateAccount,
    Callback,
    Default,
}

impl SignInError {
    /// Parse an error code from the login page query string
    pub fn from_code(code: &str) -> Self {
        match code {
            "OAuthSignin" => SignInError::OAuthSignin,
            "OAuthCallback" => SignInError::OAuthCallback,
            "OAuthCreateAccount" => SignInError::OAuthCreateAccount,
            "EmailCreateAccount" => SignInError::EmailCreateAccount,
            "Callback" => SignInError::Callback,
            _ => SignInError::Default,
        }
    }

    /// Code used in the `error` query parameter
    pub fn code(&self) -> &'static str {
        match self {
            SignInError::OAuthSignin => "OAuthSignin",
            SignInError::OAuthCallback => "OAuthCallback",
            SignInError::OAuthCreateAccount => "OAuthCreateAccount",
            SignInError::EmailCreateAccount => "EmailCreateAccount",
            SignInError::Callback => "Callback",
            SignInError::Default => "Default",
        }
    }

    /// Message shown on the login page
    pub fn message(&self) -> &'static str {
        match self {
            SignInError::OAuthSignin | SignInError::OAuthCallback => {
                "Error occurred during OAuth sign-in. Please try again."
            }
            SignInError::OAuthCreateAccount => "Could not create account. Please try again.",
            SignInError::EmailCreateAccount => {
                "Could not create account with that email. Please try again."
            }
            SignInError::Callback => "Error in callback. Please try again.",
            SignInError::Default => "An error occurred during login. Please try again.",
        }
    }

    /// Login route carrying this error
    pub fn login_path(&self) -> String {
        format!("/login?error={}", self.code())
    }
}

/// Custom error type for the web service
#[derive(Error, Debug)]
pub enum WebError {
    /// A page template failed to render
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Any other internal failure
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        tracing::error!("{}", self);

        let body = Json(json!({
            "error": "Internal server error",
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// Type alias for web handler results
pub type WebResult<T> = Result<T, WebError>;
