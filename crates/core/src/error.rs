//! Error types for the company chat service.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! the two outbound collaborators (retrieval and generation), prompt
//! rendering and unexpected internal faults.
//!
//! An empty question is not represented here: it is a normal policy outcome
//! that ends in a handoff, not a failure.

use thiserror::Error;

/// Unified error type for the company chat service.
///
/// Internal functions return `Result<T, AppError>`. The pipeline boundaries
/// convert these into degraded values so the end user only ever sees an
/// answer or the handoff message.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Retrieval service unreachable or returned something unusable
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Generation service unreachable, over quota or malformed
    #[error("LLM error: {0}")]
    Llm(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Faults inside the pipeline that no component anticipated
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
