//! Error kinds surfaced to user code.

use std::path::PathBuf;

use thiserror::Error;

/// Recoverable failures reported by public framework operations.
///
/// Invariant breaches inside the frame loop are not represented here; they
/// are programming errors and trip debug assertions instead.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// A second engine was constructed while another one is still alive.
    #[error("an engine instance already exists")]
    MultipleEngineInstance,
    /// An accessor was used before its owner was initialized, or the engine
    /// was asked to run without anything to run.
    #[error("access violation: {0}")]
    AccessViolation(String),
    /// An argument fell outside the accepted domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A file could not be opened for reading or writing.
    #[error("could not access '{}': {reason}", .path.display())]
    FileNotFound {
        /// Path that could not be accessed.
        path: PathBuf,
        /// Operating system description of the failure.
        reason: String,
    },
    /// A line of a text format could not be parsed.
    #[error("parse error on line {line}: {reason}")]
    InvalidParse {
        /// One-based line number of the offending line.
        line: usize,
        /// Description of what was wrong with the line.
        reason: String,
    },
}

impl Error {
    /// Builds an [`Error::AccessViolation`] from any displayable message.
    #[must_use]
    pub fn access_violation(message: impl Into<String>) -> Self {
        Self::AccessViolation(message.into())
    }

    /// Builds an [`Error::InvalidArgument`] from any displayable message.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Result alias used by every fallible framework operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;
