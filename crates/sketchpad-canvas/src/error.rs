//! Error types for sketchpad-canvas

use thiserror::Error;

/// Canvas error type
#[derive(Debug, Error)]
pub enum Error {
    /// Viewport dimensions are not positive finite numbers
    #[error("invalid viewport: {0}")]
    InvalidViewport(String),

    /// A `WxH` size string could not be parsed
    #[error("invalid size '{0}': expected WIDTHxHEIGHT in inches")]
    InvalidSize(String),

    /// A recorded drawing command could not be decoded
    #[error("invalid drawing command: {0}")]
    InvalidElement(String),
}

impl Error {
    /// Create an invalid viewport error
    #[must_use]
    pub fn invalid_viewport(msg: impl Into<String>) -> Self {
        Self::InvalidViewport(msg.into())
    }

    /// Get error code for protocol messages
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidViewport(_) => "invalid_viewport",
            Self::InvalidSize(_) => "invalid_size",
            Self::InvalidElement(_) => "invalid_element",
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidElement(err.to_string())
    }
}

/// Result type alias for canvas operations
pub type Result<T> = std::result::Result<T, Error>;
