mod factory;
mod repository;

pub use factory::SqliteRepositoryFactory;
pub use repository::SqliteSnapshotRepository;
