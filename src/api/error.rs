//! Failure taxonomy for the sync backend API
//!
//! Callers branch on these variants to pick user guidance: timeouts,
//! sharing problems (403) and bad identifiers (404) each get their own
//! message instead of a generic "request failed".

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use super::resilience::RetryableError;

/// Errors produced while talking to the `/sync/*` endpoints
#[derive(Debug, Error)]
pub enum ApiError {
    /// The bounded wait for a response elapsed
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// HTTP 403 from the backend
    #[error("permission denied by the backend (HTTP 403)")]
    PermissionDenied,

    /// HTTP 404 from the backend
    #[error("resource not found (HTTP 404)")]
    NotFound,

    /// Any other non-success HTTP status
    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),

    /// The backend answered `success: false`; the message is surfaced verbatim
    #[error("{0}")]
    Server(String),

    /// Connection-level failure (DNS, TLS, reset, ...)
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response body did not match the expected envelope
    #[error("malformed response: {0}")]
    Decode(#[source] serde_json::Error),

    /// No bearer token is configured for an endpoint that requires one
    #[error("no API token configured")]
    MissingToken,
}

impl ApiError {
    /// One-line guidance shown to the user alongside the raw error
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Timeout(limit) if !limit.is_zero() => format!(
                "The request timed out after {}s. The backend may be busy; try again.",
                limit.as_secs()
            ),
            ApiError::Timeout(_) => {
                "The request timed out. The backend may be busy; try again.".to_string()
            }
            ApiError::PermissionDenied => {
                "Access was denied. Check the spreadsheet's sharing settings and your API token."
                    .to_string()
            }
            ApiError::NotFound => {
                "Nothing found at that address. Check the spreadsheet ID and table name."
                    .to_string()
            }
            ApiError::Server(message) => message.clone(),
            ApiError::Status(status) => format!("The backend returned HTTP {}.", status),
            ApiError::Transport(_) => {
                "Could not reach the backend. Check the API URL and your connection.".to_string()
            }
            ApiError::Decode(_) => "The backend sent a response this client could not read.".to_string(),
            ApiError::MissingToken => {
                "No API token is configured. Run `sheetsync auth set-token` first.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest's own deadline fired before ours
            ApiError::Timeout(Duration::ZERO)
        } else {
            ApiError::Transport(err)
        }
    }
}

impl RetryableError for ApiError {
    /// Timeouts, transport failures, server errors and `success:false`
    /// responses may be transient; 403/404/decode failures never are.
    fn is_retryable(&self) -> bool {
        match self {
            ApiError::Timeout(_) | ApiError::Transport(_) | ApiError::Server(_) => true,
            ApiError::Status(status) => status.is_server_error(),
            ApiError::PermissionDenied
            | ApiError::NotFound
            | ApiError::Decode(_)
            | ApiError::MissingToken => false,
        }
    }
}
