//! Application error types

use std::path::PathBuf;

use courier_domain::DomainError;
use thiserror::Error;

use crate::ports::FileSystemError;

/// Failures that stop a whole run before it produces a summary.
///
/// Anything that goes wrong inside a single request is reported as a
/// failing result instead.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The script file could not be read.
    #[error("cannot read script {}: {source}", path.display())]
    ScriptUnreadable {
        /// Script location.
        path: PathBuf,
        /// Underlying failure.
        source: FileSystemError,
    },

    /// The script text does not follow the grammar.
    #[error("{0}")]
    Parse(String),

    /// The seed variables file is unreadable or not a JSON object.
    #[error("invalid variables file {}: {reason}", path.display())]
    InvalidVariables {
        /// Seed file location.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// The HTTP transport could not be set up.
    #[error("HTTP client setup failed: {0}")]
    HttpClient(String),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
