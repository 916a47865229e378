//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Invalid email address format
    #[error("Invalid email address: {0}")]
    InvalidEmailAddress(String),

    /// Inbound notification envelope could not be decoded
    #[error("Invalid notification envelope: {0}")]
    InvalidEnvelope(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Create an envelope error
    pub fn envelope(reason: impl Into<String>) -> Self {
        Self::InvalidEnvelope(reason.into())
    }
}
