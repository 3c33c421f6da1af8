//! Saved [`InputRecord`] snapshot, stored as JSON under a fixed key.

use tracing::{debug, warn};

use super::repository::{RepositoryError, SnapshotRepository};
use crate::models::InputRecord;

/// Key under which the current input record is stored.
pub const SNAPSHOT_KEY: &str = "property-dashboard-data";

pub struct SnapshotStore {
    repository: Box<dyn SnapshotRepository>,
}

impl SnapshotStore {
    pub fn new(repository: Box<dyn SnapshotRepository>) -> Self {
        Self { repository }
    }

    /// Loads the saved record, or the default record when nothing is saved
    /// or the saved payload does not parse.
    ///
    /// # Errors
    ///
    /// Storage failures are returned; only a missing or corrupt payload
    /// falls back to the default.
    pub async fn load_or_default(&self) -> Result<InputRecord, RepositoryError> {
        let Some(payload) = self.repository.load(SNAPSHOT_KEY).await? else {
            debug!(key = SNAPSHOT_KEY, "no saved snapshot; using default record");
            return Ok(InputRecord::default());
        };

        match serde_json::from_str::<InputRecord>(&payload) {
            Ok(record) => Ok(record),
            Err(e) => {
                warn!(key = SNAPSHOT_KEY, %e, "saved snapshot is unreadable; using default record");
                Ok(InputRecord::default())
            }
        }
    }

    pub async fn save(
        &self,
        record: &InputRecord,
    ) -> Result<(), RepositoryError> {
        let payload = serde_json::to_string_pretty(record)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        self.repository.save(SNAPSHOT_KEY, &payload).await
    }

    /// Removes the saved record. Succeeds when nothing was saved.
    pub async fn reset(&self) -> Result<(), RepositoryError> {
        match self.repository.delete(SNAPSHOT_KEY).await {
            Ok(()) | Err(RepositoryError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Raw saved payload, if any.
    pub async fn raw(&self) -> Result<Option<String>, RepositoryError> {
        self.repository.load(SNAPSHOT_KEY).await
    }
}
