//! Domain errors for the uaforge generation engine.

use thiserror::Error;

/// Errors raised outside of a single generation attempt: storage, validation,
/// configuration and state-machine misuse.
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Unsupported combination: platform {platform}, app type {app_type}")]
    UnsupportedCombination { platform: String, app_type: String },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("I/O error: {0}")]
    Io(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for DomainError {
    fn from(err: serde_yaml::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}

/// Errors scoped to one generation attempt.
///
/// None of these abort a batch on their own: the controller counts them as a
/// failed attempt and re-draws fresh inputs on the next iteration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Required pool data is absent (operator configuration problem).
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    /// A resolution step found no candidates after every fallback.
    #[error("No candidates left for {0}")]
    Exhausted(String),

    /// The composed string is already part of the batch.
    #[error("Duplicate candidate")]
    DuplicateCandidate,
}

impl GenerationError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::ConfigurationMissing(field.into())
    }

    pub fn exhausted(what: impl Into<String>) -> Self {
        Self::Exhausted(what.into())
    }
}
