pub mod factory;
pub mod repository;
pub mod snapshot;

pub use factory::{DbConfig, MemoryRepositoryFactory, RepositoryFactory, RepositoryRegistry};
pub use repository::{MemorySnapshotRepository, RepositoryError, SnapshotRepository};
pub use snapshot::{SNAPSHOT_KEY, SnapshotStore};
