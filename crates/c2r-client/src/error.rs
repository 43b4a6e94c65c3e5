//! Translation client error types.

use thiserror::Error;

/// Errors that can occur when calling the translation service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport error (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success HTTP status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        message: String,
    },

    /// HTTP succeeded but the body's `status` field marks an error.
    #[error("service error (status {status}): {message}")]
    Service {
        /// Value of the response `status` field.
        status: i64,
        /// Service-provided reason, possibly empty.
        message: String,
    },

    /// The response body is not a valid translation response.
    #[error("parse error: {0}")]
    Parse(String),

    /// The configured endpoint is not a valid URL.
    #[error("invalid service URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}
