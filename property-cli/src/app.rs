//! Command dispatch: builds the engine and snapshot store, runs one command
//! and returns its output text.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use property_core::calculations::{SavingsPlan, SavingsStrategy};
use property_core::db::{DbConfig, MemoryRepositoryFactory, RepositoryRegistry, SnapshotStore};
use property_core::{Engine, InputRecord};
use property_db_sqlite::SqliteRepositoryFactory;
use tracing::{debug, info};

use crate::cli::{Cli, Command, SavingsArgs, SnapshotCommand, StrategyArg};
use crate::config::{load_engine_config, load_input};
use crate::render::{render_loan, render_report, render_savings, render_sensitivity, render_tax};

/// Registry with every backend this binary ships.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry.register(Box::new(MemoryRepositoryFactory));
    registry
}

async fn open_store(cli: &Cli) -> Result<SnapshotStore> {
    let db_config = DbConfig {
        backend: cli.backend.clone(),
        connection_string: cli.db.clone(),
    };
    debug!(backend = %db_config.backend, "opening snapshot store");

    let repository = build_registry()
        .create(&db_config)
        .await
        .with_context(|| format!("Failed to open {} store '{}'", cli.backend, cli.db))?;
    Ok(SnapshotStore::new(repository))
}

/// `--input` when given, otherwise the saved snapshot or the default record.
async fn resolve_input(
    cli: &Cli,
    store: &SnapshotStore,
) -> Result<InputRecord> {
    match &cli.input {
        Some(path) => load_input(path)
            .with_context(|| format!("Failed to load input record: {}", path.display())),
        None => store
            .load_or_default()
            .await
            .context("Failed to load saved input record"),
    }
}

fn savings_plan(
    engine: &Engine,
    input: &InputRecord,
    args: &SavingsArgs,
) -> Result<SavingsPlan> {
    let base = engine
        .consolidate(input)
        .context("Failed to consolidate input record")?;
    let annual_return = args.annual_return.unwrap_or(input.investment_return_rate);

    let plan = match args.strategy {
        StrategyArg::Milestones => SavingsPlan {
            current: args.current.unwrap_or(base.current_savings),
            target: args.target.unwrap_or(base.savings_target),
            monthly_contribution: args.monthly.unwrap_or(base.monthly_savings),
            strategy: SavingsStrategy::Milestones {
                annual_return_pct: annual_return,
            },
        },
        StrategyArg::Inflation => SavingsPlan {
            current: args.current.unwrap_or_default(),
            target: args.target.unwrap_or(base.savings_target),
            monthly_contribution: args.monthly.unwrap_or(base.monthly_savings),
            strategy: SavingsStrategy::InflationAdjusted {
                expected_return_pct: annual_return,
                inflation_pct: args
                    .inflation
                    .unwrap_or(engine.config().default_inflation_pct),
            },
        },
    };
    Ok(plan)
}

/// Runs `cli.command` with `today` as the reference date for projections.
pub async fn run(
    cli: &Cli,
    today: NaiveDate,
) -> Result<String> {
    let config = load_engine_config(
        cli.config.as_deref(),
        cli.tax_table.as_deref(),
        cli.table_version.as_deref(),
    )
    .context("Failed to load engine configuration")?;
    let engine = Engine::new(config).context("Invalid engine configuration")?;

    match &cli.command {
        Command::Tax { annual } => {
            let tax = engine
                .tax(*annual)
                .with_context(|| format!("Failed to compute tax on {annual}"))?;
            Ok(render_tax(&tax))
        }
        Command::Loan {
            principal,
            rate,
            years,
            extra,
        } => {
            let loan = engine
                .loan_projection(*principal, *rate, *years, *extra)
                .context("Failed to project loan")?;
            Ok(render_loan(&loan))
        }
        Command::Report { json } => {
            let store = open_store(cli).await?;
            let input = resolve_input(cli, &store).await?;
            let report = engine.report(&input).context("Failed to compute report")?;
            if *json {
                serde_json::to_string_pretty(&report).context("Failed to serialize report")
            } else {
                Ok(render_report(&report, today))
            }
        }
        Command::Savings(args) => {
            let store = open_store(cli).await?;
            let input = resolve_input(cli, &store).await?;
            let plan = savings_plan(&engine, &input, args)?;
            let savings = engine.project(&plan).context("Failed to project savings")?;
            Ok(render_savings(&savings, today))
        }
        Command::Sensitivity => {
            let store = open_store(cli).await?;
            let input = resolve_input(cli, &store).await?;
            let base = engine
                .consolidate(&input)
                .context("Failed to consolidate input record")?;
            let report = engine
                .sensitivity(&input, &base)
                .context("Failed to compute sensitivity")?;
            Ok(render_sensitivity(&report))
        }
        Command::Snapshot(command) => {
            let store = open_store(cli).await?;
            run_snapshot(cli, &store, command).await
        }
    }
}

async fn run_snapshot(
    cli: &Cli,
    store: &SnapshotStore,
    command: &SnapshotCommand,
) -> Result<String> {
    match command {
        SnapshotCommand::Show => match store.raw().await.context("Failed to read snapshot")? {
            Some(payload) => Ok(payload),
            None => Ok("No saved input record; the default record is in use.".to_string()),
        },
        SnapshotCommand::Save => {
            let input = match &cli.input {
                Some(path) => load_input(path)
                    .with_context(|| format!("Failed to load input record: {}", path.display()))?,
                None => InputRecord::default(),
            };
            store.save(&input).await.context("Failed to save snapshot")?;
            info!(backend = %cli.backend, "input record saved");
            Ok("Input record saved.".to_string())
        }
        SnapshotCommand::Reset => {
            store.reset().await.context("Failed to reset snapshot")?;
            info!(backend = %cli.backend, "saved input record removed");
            Ok("Saved input record removed.".to_string())
        }
    }
}

/// Today's local date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
