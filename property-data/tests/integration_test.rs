//! Integration tests for tax table loading against the SQLite backend.

use pretty_assertions::assert_eq;
use property_core::models::EngineConfig;
use property_core::{Engine, SnapshotRepository, TaxTable};
use property_data::{TaxTableLoader, TaxTableLoaderError};
use property_db_sqlite::SqliteSnapshotRepository;
use rust_decimal_macros::dec;
use sqlx::sqlite::SqlitePoolOptions;

const TEST_CSV: &str = include_str!("../test-data/tax_tables.csv");

async fn setup_test_db() -> SqliteSnapshotRepository {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    let repo = SqliteSnapshotRepository::new_with_pool(pool).await;
    repo.run_migrations()
        .await
        .expect("Failed to run migrations");

    repo
}

#[tokio::test]
async fn test_store_all_versions() {
    let repo = setup_test_db().await;
    let tables = TaxTableLoader::read(TEST_CSV.as_bytes()).expect("Failed to read CSV");

    let stored = TaxTableLoader::store(&repo, tables.values())
        .await
        .expect("Failed to store tables");

    assert_eq!(stored, 2);
    assert_eq!(
        TaxTableLoader::stored_versions(&repo)
            .await
            .expect("Failed to list versions"),
        vec!["2022/23".to_string(), "2024/25".to_string()]
    );
}

#[tokio::test]
async fn test_store_and_fetch_table() {
    let repo = setup_test_db().await;
    let tables = TaxTableLoader::read(TEST_CSV.as_bytes()).expect("Failed to read CSV");
    TaxTableLoader::store(&repo, tables.values())
        .await
        .expect("Failed to store tables");

    let table = TaxTableLoader::fetch(&repo, "2022/23")
        .await
        .expect("Failed to fetch table");

    assert_eq!(table.brackets.len(), 7);
    assert_eq!(table.brackets[0].threshold, dec!(0));
    assert_eq!(table.brackets[0].rate, dec!(18));
    assert_eq!(table.brackets[6].threshold, dec!(1731600));
    assert_eq!(table.brackets[6].base_tax, dec!(614192));
    assert_eq!(table.rebate, dec!(16425));
}

#[tokio::test]
async fn test_store_is_idempotent() {
    let repo = setup_test_db().await;
    let tables = TaxTableLoader::read(TEST_CSV.as_bytes()).expect("Failed to read CSV");

    TaxTableLoader::store(&repo, tables.values())
        .await
        .expect("First store failed");
    TaxTableLoader::store(&repo, tables.values())
        .await
        .expect("Second store failed");

    assert_eq!(repo.list_keys().await.expect("Failed to list keys").len(), 2);
}

#[tokio::test]
async fn test_store_replaces_existing_table() {
    let repo = setup_test_db().await;
    let stale = TaxTable::new("2024/25", TaxTable::default().brackets, dec!(1))
        .expect("Failed to build table");
    TaxTableLoader::store(&repo, [&stale])
        .await
        .expect("Failed to store stale table");

    let tables = TaxTableLoader::read(TEST_CSV.as_bytes()).expect("Failed to read CSV");
    TaxTableLoader::store(&repo, tables.values())
        .await
        .expect("Failed to store tables");

    let table = TaxTableLoader::fetch(&repo, "2024/25")
        .await
        .expect("Failed to fetch table");
    assert_eq!(table.rebate, dec!(17235));
}

#[tokio::test]
async fn test_fetch_unknown_version() {
    let repo = setup_test_db().await;

    let result = TaxTableLoader::fetch(&repo, "2030/31").await;

    assert_eq!(
        result,
        Err(TaxTableLoaderError::VersionNotFound("2030/31".to_string()))
    );
}

#[tokio::test]
async fn test_fetched_table_drives_engine() {
    let repo = setup_test_db().await;
    let tables = TaxTableLoader::read(TEST_CSV.as_bytes()).expect("Failed to read CSV");
    TaxTableLoader::store(&repo, tables.values())
        .await
        .expect("Failed to store tables");

    let table = TaxTableLoader::fetch(&repo, "2024/25")
        .await
        .expect("Failed to fetch table");
    let engine = Engine::new(EngineConfig {
        tax_table: table,
        ..EngineConfig::default()
    })
    .expect("Failed to build engine");

    let result = engine.tax(dec!(475200)).expect("Failed to compute tax");

    assert_eq!(result.tax_before_rebate, dec!(109819));
    assert_eq!(result.annual_tax, dec!(92584));
}

#[tokio::test]
async fn test_older_table_gives_different_tax() {
    let tables = TaxTableLoader::read(TEST_CSV.as_bytes()).expect("Failed to read CSV");
    let table = TaxTableLoader::select(&tables, Some("2022/23")).expect("Failed to select");
    let engine = Engine::new(EngineConfig {
        tax_table: table,
        ..EngineConfig::default()
    })
    .expect("Failed to build engine");

    let result = engine.tax(dec!(475200)).expect("Failed to compute tax");

    // 73726 + (475200 − 353100) × 31% = 111577; less 16425 rebate
    assert_eq!(result.tax_before_rebate, dec!(111577));
    assert_eq!(result.annual_tax, dec!(95152));
}
