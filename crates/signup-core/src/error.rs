//! Error types for the signup registry
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for signup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the signup registry
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or disallowed request payload
    #[error("validation error: {0}")]
    Validation(String),

    /// Student id absent from roster, or record never created
    #[error("not found: {0}")]
    NotFound(String),

    /// Record creation attempted for an already-registered student
    #[error("record already exists: {0}")]
    AlreadyExists(String),

    /// Record store I/O or consistency errors
    #[error("record store error: {0}")]
    Store(String),

    /// Roster snapshot errors (unreadable or unparsable)
    #[error("roster error: {0}")]
    Roster(String),

    /// Mail transport failed to deliver a token
    #[error("mail dispatch error: {0}")]
    Dispatch(String),

    /// Audit log append errors
    #[error("audit log error: {0}")]
    Audit(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an "already exists" error
    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    /// Create a record store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a roster error
    pub fn roster(msg: impl Into<String>) -> Self {
        Self::Roster(msg.into())
    }

    /// Create a mail dispatch error
    pub fn dispatch(msg: impl Into<String>) -> Self {
        Self::Dispatch(msg.into())
    }

    /// Create an audit log error
    pub fn audit(msg: impl Into<String>) -> Self {
        Self::Audit(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
