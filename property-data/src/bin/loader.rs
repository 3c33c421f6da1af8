use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use property_data::TaxTableLoader;
use property_db_sqlite::SqliteSnapshotRepository;

/// Load versioned tax tables from a CSV file into the database.
///
/// The CSV file should have the following columns:
/// - version: The table version label (e.g., 2024/25)
/// - kind: `bracket` or `rebate`
/// - threshold: Annual income where the bracket starts (empty for rebates)
/// - rate: The marginal rate as a whole percentage (e.g., 26)
/// - base: The base tax at the threshold, or the rebate amount
#[derive(Parser, Debug)]
#[command(name = "property-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing tax table data
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite database URL (e.g., sqlite:property.db?mode=rwc to create if missing)
    #[arg(short, long, default_value = "sqlite:property.db?mode=rwc")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let repo = SqliteSnapshotRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    println!("Loading tax tables from: {}", args.file.display());

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;

    let tables = TaxTableLoader::read(file)
        .with_context(|| format!("Failed to read tax tables: {}", args.file.display()))?;

    println!(
        "Parsed {} versions from CSV: {}",
        tables.len(),
        tables.keys().cloned().collect::<Vec<_>>().join(", ")
    );

    let stored = TaxTableLoader::store(&repo, tables.values())
        .await
        .context("Failed to store tax tables in the database")?;

    println!("Successfully stored {} tax tables in the database.", stored);

    Ok(())
}
