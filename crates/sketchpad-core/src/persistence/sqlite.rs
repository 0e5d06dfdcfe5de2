//! SQLite backend
//!
//! One table of string keys and string values. An optional quota caps the
//! total of key and value lengths across the table.

use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Row,
};
use std::path::Path;
use std::str::FromStr;

use super::backend::{KeyValueBackend, StorageError};

/// SQLite-based key-value store
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
    quota: Option<usize>,
}

impl SqliteBackend {
    /// Create a backend over an existing pool
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool, quota: None }
    }

    /// Open (or create) a database file and initialize the schema
    pub async fn open(path: &Path) -> Result<Self, StorageError> {
        let url = format!("sqlite://{}", path.display());
        let options = SqliteConnectOptions::from_str(&url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        let backend = Self::new(pool);
        backend.init().await?;
        Ok(backend)
    }

    /// In-memory database, mostly for tests
    pub async fn in_memory() -> Result<Self, StorageError> {
        // A single connection that is never recycled keeps the database alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        let backend = Self::new(pool);
        backend.init().await?;
        Ok(backend)
    }

    /// Cap total stored bytes
    #[must_use]
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Initialize the database schema
    pub async fn init(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sketchpad_kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn used_bytes_excluding(&self, key: &str) -> Result<usize, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0) AS used
            FROM sketchpad_kv
            WHERE key != ?
            "#,
        )
        .bind(key)
        .fetch_one(&self.pool)
        .await?;

        let used: i64 = row.get("used");
        Ok(usize::try_from(used).unwrap_or(0))
    }
}

#[async_trait]
impl KeyValueBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query(
            r#"
            SELECT value FROM sketchpad_kv WHERE key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| row.get("value")))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let needed = self.used_bytes_excluding(key).await? + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO sketchpad_kv (key, value, updated_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            DELETE FROM sketchpad_kv WHERE key = ?
            "#,
        )
        .bind(key)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT key FROM sketchpad_kv ORDER BY key
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| row.get("key")).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_db() -> SqliteBackend {
        SqliteBackend::in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_backend_init_is_idempotent() {
        let backend = setup_test_db().await;
        backend.init().await.unwrap();
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let backend = setup_test_db().await;
        backend.set("sketchpad:name", "\"T\"").await.unwrap();
        backend.set("sketchpad:name", "\"U\"").await.unwrap();

        let value = backend.get("sketchpad:name").await.unwrap();
        assert_eq!(value.as_deref(), Some("\"U\""));
        assert!(backend.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_and_keys() {
        let backend = setup_test_db().await;
        backend.set("b", "2").await.unwrap();
        backend.set("a", "1").await.unwrap();
        assert_eq!(backend.keys().await.unwrap(), vec!["a", "b"]);

        backend.remove("a").await.unwrap();
        backend.remove("a").await.unwrap();
        assert_eq!(backend.keys().await.unwrap(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_quota_exceeded() {
        let backend = setup_test_db().await.with_quota(16);
        backend.set("key", "0123456789").await.unwrap();

        let err = backend.set("other", "0123456789").await.unwrap_err();
        assert!(err.is_quota_exceeded());

        // Replacing an existing key only counts the new value
        backend.set("key", "abcdefghijk").await.unwrap();
    }

    #[tokio::test]
    async fn test_multibyte_values() {
        let backend = setup_test_db().await;
        let value = "\"円を描く ✏️\"";
        backend.set("k", value).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap().as_deref(), Some(value));
    }
}
