use async_trait::async_trait;
use property_core::db::{DbConfig, RepositoryError, RepositoryFactory, SnapshotRepository};

use crate::repository::SqliteSnapshotRepository;

/// Map a [`DbConfig::connection_string`] to a sqlx URL.
///
/// * `":memory:"` becomes `sqlite::memory:`.
/// * Strings already starting with `sqlite:` pass through.
/// * Anything else is a file path, created if missing.
fn database_url(connection_string: &str) -> String {
    match connection_string {
        ":memory:" => "sqlite::memory:".to_string(),
        s if s.starts_with("sqlite:") => s.to_string(),
        path => format!("sqlite:{path}?mode=rwc"),
    }
}

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with a [`property_core::db::RepositoryRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use property_core::db::RepositoryRegistry;
/// use property_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Open the database described by `config.connection_string` and run
    /// migrations.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn SnapshotRepository>, RepositoryError> {
        let repo = SqliteSnapshotRepository::new(&database_url(&config.connection_string))
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        Ok(Box::new(repo))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use property_core::db::{DbConfig, RepositoryFactory};

    use super::{SqliteRepositoryFactory, database_url};

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteRepositoryFactory.backend_name(), "sqlite");
    }

    #[test]
    fn database_url_mapping() {
        assert_eq!(database_url(":memory:"), "sqlite::memory:");
        assert_eq!(database_url("sqlite:a.db"), "sqlite:a.db");
        assert_eq!(database_url("data/property.db"), "sqlite:data/property.db?mode=rwc");
    }

    /// Full round-trip: factory → SqliteSnapshotRepository with an in-memory DB.
    #[tokio::test]
    async fn creates_in_memory_repository() {
        let config = DbConfig {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        };

        let repo = SqliteRepositoryFactory
            .create(&config)
            .await
            .expect("failed to create in-memory repository");

        repo.save("k", "v").await.expect("Should save");
        assert_eq!(repo.load("k").await, Ok(Some("v".to_string())));
    }
}
