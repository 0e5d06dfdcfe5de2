//! Error types for sketchpad-core
//!
//! Script faults are not errors: they travel as `ExecutionOutcome` values.
//! This module covers the remaining taxonomy: malformed projects or
//! exchange files, storage problems, and file I/O.

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed project or exchange file
    #[error("validation error: {0}")]
    Validation(String),

    /// Durable store unavailable or over quota
    #[error("storage error: {0}")]
    Storage(String),

    /// File system error
    #[error("io error: {0}")]
    Io(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Surface or viewport error from the canvas layer
    #[error(transparent)]
    Canvas(#[from] sketchpad_canvas::Error),
}

impl Error {
    /// Create a validation error
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a storage error
    #[must_use]
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Check if the current in-memory state can keep going after this error
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Validation(_) | Self::Canvas(_))
    }

    /// Get error code for protocol messages
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Storage(_) => "storage_error",
            Self::Io(_) => "io_error",
            Self::Serialization(_) => "serialization_error",
            Self::Canvas(err) => err.code(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::validation("x").code(), "validation_error");
        assert_eq!(Error::storage("x").code(), "storage_error");
    }

    #[test]
    fn test_error_is_recoverable() {
        assert!(Error::storage("quota").is_recoverable());
        assert!(!Error::Io("disk".into()).is_recoverable());
    }

    #[test]
    fn test_from_serde_error() {
        let result: std::result::Result<i32, serde_json::Error> = serde_json::from_str("{");
        let err: Error = result.unwrap_err().into();
        assert_eq!(err.code(), "serialization_error");
    }

    #[test]
    fn test_from_canvas_error() {
        let err: Error = sketchpad_canvas::Error::invalid_viewport("zero").into();
        assert!(matches!(err, Error::Canvas(_)));
        assert!(err.is_recoverable());
    }
}
