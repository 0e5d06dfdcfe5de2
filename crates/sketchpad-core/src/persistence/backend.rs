//! Key-value substrate behind the persistence gateway

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by a key-value backend
#[derive(Debug, Error)]
pub enum StorageError {
    /// The write would exceed the backend's capacity
    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded {
        /// Bytes the store would hold after the write
        needed: usize,
        /// Configured capacity
        quota: usize,
    },

    /// The backend cannot be used at all
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Check if this is a capacity failure
    #[must_use]
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        Self::Backend(err.to_string())
    }
}

/// String-keyed blob store
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Read a value
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value; removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// All stored keys
    async fn keys(&self) -> Result<Vec<String>, StorageError>;
}
