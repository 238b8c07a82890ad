//! Error types for the core library.

use thiserror::Error;

use crate::account::ValidationError;

/// Errors that can occur in core operations.
///
/// A missing avatar is not an error; it is reported as `None` by the resolver.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Identity precondition violated.
    #[error("Invalid identity: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),
}

impl From<Vec<ValidationError>> for Error {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Validation(errors)
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ValidationError::message)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
