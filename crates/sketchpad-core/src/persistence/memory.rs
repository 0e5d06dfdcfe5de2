//! In-process backend

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::backend::{KeyValueBackend, StorageError};

/// Map-backed store with an optional byte quota.
///
/// Usage is counted as key bytes plus value bytes. Writes per key are
/// counted so callers can observe how often something was persisted.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
    writes: RwLock<HashMap<String, u64>>,
    quota: Option<usize>,
    unavailable: AtomicBool,
}

impl MemoryBackend {
    /// Create an unbounded store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap total stored bytes
    #[must_use]
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Make every operation fail as if the store were switched off
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of successful writes to `key`
    pub async fn writes_for(&self, key: &str) -> u64 {
        self.writes.read().await.get(key).copied().unwrap_or(0)
    }

    /// Bytes currently stored
    pub async fn used_bytes(&self) -> usize {
        self.entries
            .read()
            .await
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }

    /// Store a raw value without quota checks or counting
    pub async fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StorageError::Unavailable("memory store switched off".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_available()?;
        let mut entries = self.entries.write().await;

        if let Some(quota) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        drop(entries);
        *self.writes.write().await.entry(key.to_string()).or_insert(0) += 1;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.check_available()?;
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let backend = MemoryBackend::new();
        backend.set("a", "1").await.unwrap();
        assert_eq!(backend.get("a").await.unwrap().as_deref(), Some("1"));

        backend.remove("a").await.unwrap();
        backend.remove("a").await.unwrap();
        assert!(backend.get("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_quota_counts_replacement_once() {
        let backend = MemoryBackend::new().with_quota(10);
        backend.set("k", "12345").await.unwrap();
        backend.set("k", "123456789").await.unwrap();

        let err = backend.set("k2", "x").await.unwrap_err();
        assert!(err.is_quota_exceeded());
        assert_eq!(backend.used_bytes().await, 10);
    }

    #[tokio::test]
    async fn test_write_counter() {
        let backend = MemoryBackend::new();
        backend.set("k", "1").await.unwrap();
        backend.set("k", "2").await.unwrap();
        assert_eq!(backend.writes_for("k").await, 2);
        assert_eq!(backend.writes_for("other").await, 0);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let backend = MemoryBackend::new();
        backend.set_unavailable(true);
        assert!(matches!(
            backend.set("k", "v").await,
            Err(StorageError::Unavailable(_))
        ));
        backend.set_unavailable(false);
        assert!(backend.set("k", "v").await.is_ok());
    }
}
