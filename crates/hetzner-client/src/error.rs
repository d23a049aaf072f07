//! Error types for the Hetzner client

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when using the Hetzner client
///
/// Every variant is terminal for the call that produced it; nothing in this
/// crate retries or swallows an error.
#[derive(Error, Debug)]
pub enum ClientError {
    /// API returned a non-2xx status with an `{"error": {...}}` body
    #[error("{code}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error code from the body, `ERROR` when absent
        code: String,
        /// Error message from the body, `Unknown error` when absent
        message: String,
    },

    /// API returned a non-2xx status without a parseable error body
    #[error("HTTP {status}: {status_text}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Reason phrase for the status
        status_text: String,
    },

    /// Action reached `error` state
    #[error("Action {id} failed: {message}")]
    ActionFailed {
        /// Action id
        id: u64,
        /// Error code reported on the action, if any
        code: Option<String>,
        /// Error message reported on the action
        message: String,
    },

    /// Action did not finish within the polling budget
    #[error("Action {id} timed out after {}ms", timeout.as_millis())]
    Timeout {
        /// Action id
        id: u64,
        /// Budget that was exceeded
        timeout: Duration,
    },

    /// Waiting for an action was cancelled by the caller
    #[error("Action {id} wait cancelled")]
    Cancelled {
        /// Action id
        id: u64,
    },

    /// HTTP transport failed (connect, TLS, body read)
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Invalid response format
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Client could not be configured
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status of an API failure, if this error came from one
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } | ClientError::Http { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Error code reported by the server, if any
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Api { code, .. } => Some(code),
            ClientError::ActionFailed { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Whether the server answered 404
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
