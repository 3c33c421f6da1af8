use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Key/value storage for serialized snapshots.
///
/// Payloads are opaque text; callers decide the format.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Returns the payload stored under `key`, if any.
    async fn load(&self, key: &str) -> Result<Option<String>, RepositoryError>;

    /// Inserts or replaces the payload stored under `key`.
    async fn save(&self, key: &str, payload: &str) -> Result<(), RepositoryError>;

    /// Removes `key`. Fails with [`RepositoryError::NotFound`] if absent.
    async fn delete(&self, key: &str) -> Result<(), RepositoryError>;

    /// Every stored key, sorted.
    async fn list_keys(&self) -> Result<Vec<String>, RepositoryError>;
}

/// Process-local repository; contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemorySnapshotRepository {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemorySnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, RepositoryError> {
        self.entries
            .lock()
            .map_err(|e| RepositoryError::Database(e.to_string()))
    }
}

#[async_trait]
impl SnapshotRepository for MemorySnapshotRepository {
    async fn load(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        Ok(self.entries()?.get(key).cloned())
    }

    async fn save(&self, key: &str, payload: &str) -> Result<(), RepositoryError> {
        self.entries()?.insert(key.to_string(), payload.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        self.entries()?
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(key.to_string()))
    }

    async fn list_keys(&self) -> Result<Vec<String>, RepositoryError> {
        Ok(self.entries()?.keys().cloned().collect())
    }
}
