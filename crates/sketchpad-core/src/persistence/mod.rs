//! PersistenceGateway - durable key-value storage that never fails loudly
//!
//! The gateway owns no domain data. It stores serialized blobs under
//! namespaced keys and turns every backend failure into a `false` or a
//! `None`, so storage trouble degrades the session to in-memory operation
//! instead of interrupting the edit loop.

/// Backend trait and storage failures.
pub mod backend;
/// In-process backend.
pub mod memory;
/// SQLite backend.
pub mod sqlite;

pub use backend::{KeyValueBackend, StorageError};
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default key namespace
pub const DEFAULT_NAMESPACE: &str = "sketchpad";

const PROBE_KEY: &str = "__probe__";

/// Namespaced, failure-absorbing access to a key-value backend
#[derive(Clone)]
pub struct PersistenceGateway {
    backend: Arc<dyn KeyValueBackend>,
    namespace: String,
}

impl std::fmt::Debug for PersistenceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceGateway")
            .field("backend", &self.backend.name())
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl PersistenceGateway {
    /// Create a gateway using the default namespace
    #[must_use]
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self {
            backend,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Use a different key namespace
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Name of the underlying backend
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Key namespace
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Backend key for a gateway key
    #[must_use]
    pub fn full_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    fn is_managed(&self, full_key: &str) -> bool {
        full_key
            .strip_prefix(self.namespace.as_str())
            .is_some_and(|rest| rest.starts_with(':'))
    }

    /// Probe the backend with a throwaway write and delete
    pub async fn is_available(&self) -> bool {
        let key = self.full_key(PROBE_KEY);
        let result = match self.backend.set(&key, "1").await {
            Ok(()) => self.backend.remove(&key).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => true,
            Err(err) => {
                debug!(backend = self.backend.name(), error = %err, "Storage probe failed");
                false
            }
        }
    }

    /// Serialize and store a value.
    ///
    /// On a capacity failure every managed key is cleared once and the write
    /// retried. Returns `false` if the value could not be stored.
    pub async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(err) => {
                warn!(key, error = %err, "Could not serialize value for storage");
                return false;
            }
        };

        let full_key = self.full_key(key);
        match self.backend.set(&full_key, &text).await {
            Ok(()) => true,
            Err(err) if err.is_quota_exceeded() => {
                warn!(key, error = %err, "Storage quota exceeded, clearing managed keys and retrying");
                self.clear().await;
                match self.backend.set(&full_key, &text).await {
                    Ok(()) => true,
                    Err(err) => {
                        warn!(key, error = %err, "Storage write failed after clearing");
                        false
                    }
                }
            }
            Err(err) => {
                warn!(key, error = %err, "Storage write failed");
                false
            }
        }
    }

    /// Load and deserialize a value; any failure yields `None`
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let text = match self.backend.get(&self.full_key(key)).await {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(err) => {
                warn!(key, error = %err, "Storage read failed");
                return None;
            }
        };

        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "Stored value is corrupt, ignoring it");
                None
            }
        }
    }

    /// Remove a single key; returns `false` on backend failure
    pub async fn remove(&self, key: &str) -> bool {
        match self.backend.remove(&self.full_key(key)).await {
            Ok(()) => true,
            Err(err) => {
                warn!(key, error = %err, "Storage remove failed");
                false
            }
        }
    }

    /// Remove every key in this gateway's namespace
    pub async fn clear(&self) {
        let keys = match self.backend.keys().await {
            Ok(keys) => keys,
            Err(err) => {
                warn!(error = %err, "Could not list storage keys");
                return;
            }
        };

        for key in keys.iter().filter(|k| self.is_managed(k)) {
            if let Err(err) = self.backend.remove(key).await {
                warn!(key = %key, error = %err, "Storage remove failed");
            }
        }
    }
}
