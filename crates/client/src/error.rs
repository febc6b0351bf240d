//! Client error types.
//!
//! Every helper on [`SessionClient`](crate::SessionClient) returns
//! `Result<T, ClientError>`. Errors are never retried or swallowed by the
//! client; they travel back to the caller exactly as they were produced.

use thiserror::Error;

/// Message used when a failed response carries no usable `error` field.
pub const FALLBACK_ERROR_MESSAGE: &str = "Request failed";

/// Errors that can occur when talking to the API.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a usable JSON body.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-ok status.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The body's `error` field, or [`FALLBACK_ERROR_MESSAGE`].
        message: String,
    },

    /// The server answered ok but the body did not have the expected shape.
    #[error("Unexpected response from {path}: {message}")]
    Schema {
        /// Endpoint path the response came from.
        path: String,
        /// Deserialization failure.
        message: String,
    },

    /// Persisting the session failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ClientError {
    /// Build an API error from a failed response body.
    ///
    /// Uses the body's `error` field when it is a non-empty string, otherwise
    /// falls back to [`FALLBACK_ERROR_MESSAGE`] so the message is never empty.
    #[must_use]
    pub fn from_error_body(status: u16, body: &serde_json::Value) -> Self {
        let message = body
            .get("error")
            .and_then(serde_json::Value::as_str)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or(FALLBACK_ERROR_MESSAGE)
            .to_owned();

        Self::Api { status, message }
    }

    /// HTTP status of an API error, if this is one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server rejected the credentials (401) or the role (403).
    ///
    /// The client does not react to this on its own; callers decide whether
    /// to log out or prompt for a fresh login.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }
}

/// Network-level and body-parsing failures.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS, or I/O failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The response body was not valid JSON.
    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Errors from a [`SessionStore`](crate::session::SessionStore).
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file could not be encoded or decoded.
    #[error("Session storage format error: {0}")]
    Format(#[from] serde_json::Error),
}
