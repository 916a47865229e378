//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Failures of the upstream row source
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Source could not be reached or returned an error
    #[error("Row source unavailable: {0}")]
    Unavailable(String),

    /// Range returned no rows at all
    #[error("Row source returned no rows for {range}")]
    Empty {
        /// Range that was requested, e.g. `Istruzioni!A:C`
        range: String,
    },
}

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Row source error with nothing cached to fall back on
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Source(SourceError::Unavailable(_)))
    }
}
