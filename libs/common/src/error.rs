//! Error types for calls to the external backend
//!
//! Every failure of an outbound backend call ends up here. None of them are
//! retried; callers surface a generic message and stop.

use reqwest::StatusCode;
use thiserror::Error;

/// Custom error type for backend calls
#[derive(Error, Debug)]
pub enum BackendError {
    /// No backend token is available, so no request was sent
    #[error("Backend token is missing")]
    MissingToken,

    /// The configured base URL or a derived endpoint is not a valid URL
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    /// The request could not be sent or the response could not be decoded
    #[error("Backend request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status
    #[error("Backend returned {status}")]
    Status {
        status: StatusCode,
        message: Option<String>,
    },
}

impl BackendError {
    /// Message shown to the user for this failure.
    ///
    /// Uses the message field of the backend's error body when there is one,
    /// otherwise the given generic message.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            BackendError::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Type alias for Result with BackendError
pub type BackendResult<T> = Result<T, BackendError>;
