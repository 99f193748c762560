//! Domain error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A header name is empty or contains characters not allowed in a token.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Categories of request failures, reported alongside failing results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestErrorKind {
    /// Invalid URL format.
    InvalidUrl,

    /// The liveness probe timed out.
    ServerUnreachable,

    /// The request itself timed out.
    Timeout,

    /// Connection-level failure (refused, DNS, TLS, reset).
    NetworkFailure,

    /// A multipart file part names a file that does not exist.
    FileNotFound,

    /// The body could not be built (e.g. malformed multipart text).
    InvalidBody,
}

impl RequestErrorKind {
    /// Returns user-friendly suggestions for this error type.
    #[must_use]
    pub const fn suggestions(&self) -> &[&'static str] {
        match self {
            Self::InvalidUrl => &[
                "Check that the URL starts with http:// or https://",
                "Check for variables that were not substituted",
            ],
            Self::ServerUnreachable | Self::NetworkFailure => &[
                "Check if the server is running",
                "Verify the host and port are correct",
            ],
            Self::Timeout => &["The server may be slow or overloaded"],
            Self::FileNotFound => &["File paths are resolved against the base directory"],
            Self::InvalidBody => &["Check the multipart boundary and part headers"],
        }
    }

    /// Returns a human-readable title for this error type.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::InvalidUrl => "Invalid URL",
            Self::ServerUnreachable => "Server Unreachable",
            Self::Timeout => "Request Timeout",
            Self::NetworkFailure => "Network Failure",
            Self::FileNotFound => "File Not Found",
            Self::InvalidBody => "Invalid Request Body",
        }
    }
}
