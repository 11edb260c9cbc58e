//! Error types for the WHM API client.
//!
//! # Design
//! Every failure surfaces as one `ApiError` variant and is returned to the
//! immediate caller unchanged. Nothing is retried. `Decode` only appears when
//! the client was configured with `strict_decoding`; the default decoder is
//! permissive and never fails.

use thiserror::Error;

use crate::config::ResponseFormat;

/// Errors returned by `WhmClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Username or password was not set when a request was built.
    #[error("credentials must be configured before making requests")]
    Configuration,

    /// A required operation input was missing or empty.
    #[error("{operation}: missing required field(s): {}", .fields.join(", "))]
    Validation {
        operation: &'static str,
        fields: Vec<&'static str>,
    },

    /// The connection, TLS negotiation or HTTP exchange could not complete.
    #[error("transport error: {message} => {url}?{body}")]
    Transport {
        message: String,
        url: String,
        body: String,
    },

    /// The response body could not be parsed in strict mode.
    #[error("failed to decode {format} response: {message}")]
    Decode {
        format: ResponseFormat,
        message: String,
    },
}

/// Result type alias for WHM client operations.
pub type Result<T> = std::result::Result<T, ApiError>;
