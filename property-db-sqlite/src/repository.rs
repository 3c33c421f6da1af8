use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use property_core::{RepositoryError, SnapshotRepository};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::debug;

pub struct SqliteSnapshotRepository {
    pool: SqlitePool,
}

impl SqliteSnapshotRepository {
    /// Connect to `database_url` (a sqlx URL such as `sqlite:property.db?mode=rwc`).
    ///
    /// In-memory URLs get a single connection so every query sees the same
    /// database.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new().max_connections(1)
        } else {
            SqlitePoolOptions::new()
        };
        let pool = options
            .connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to '{database_url}'"))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// When `key` was last saved, if it exists.
    pub async fn updated_at(
        &self,
        key: &str,
    ) -> Result<Option<DateTime<Utc>>, RepositoryError> {
        let row = sqlx::query("SELECT updated_at FROM snapshots WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        row.map(|r| r.try_get::<DateTime<Utc>, _>("updated_at"))
            .transpose()
            .map_err(|e| RepositoryError::Database(e.to_string()))
    }
}

#[async_trait]
impl SnapshotRepository for SqliteSnapshotRepository {
    async fn load(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query("SELECT payload FROM snapshots WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        row.map(|r| r.try_get::<String, _>("payload"))
            .transpose()
            .map_err(|e| RepositoryError::Database(e.to_string()))
    }

    async fn save(&self, key: &str, payload: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO snapshots (key, payload, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        debug!(key, bytes = payload.len(), "snapshot saved");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM snapshots WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(key.to_string()));
        }

        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>, RepositoryError> {
        let rows = sqlx::query("SELECT key FROM snapshots ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter()
            .map(|r| {
                r.try_get::<String, _>("key")
                    .map_err(|e| RepositoryError::Database(e.to_string()))
            })
            .collect()
    }
}
