use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use crate::format::parse_decimal;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Buy, rent out, or keep renting and save: property decision calculator.
///
/// Inputs come from `--input` when given, otherwise from the saved snapshot,
/// otherwise from the built-in default record.
#[derive(Debug, Parser)]
#[command(name = "propcalc", version, about)]
pub struct Cli {
    /// Engine configuration (TOML). Unlisted fields keep their defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Input record (TOML). Unlisted fields take default values.
    #[arg(long, global = true)]
    pub input: Option<PathBuf>,

    /// Tax tables (CSV) replacing the built-in table.
    #[arg(long, global = true)]
    pub tax_table: Option<PathBuf>,

    /// Version to use from `--tax-table`; the latest when omitted.
    #[arg(long, global = true, requires = "tax_table")]
    pub table_version: Option<String>,

    /// Snapshot storage backend.
    #[arg(long, global = true, default_value = "sqlite")]
    pub backend: String,

    /// Snapshot connection string.
    /// For SQLite this is a file path (e.g. `property.db`) or `:memory:`.
    #[arg(long, global = true, default_value = "property.db")]
    pub db: String,

    /// Also append log records to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Log at debug level (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Every calculation for the current input.
    Report {
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Income tax on an annual income.
    Tax {
        /// Annual taxable income.
        #[arg(value_parser = parse_decimal)]
        annual: Decimal,
    },

    /// Bond repayment, with an optional extra monthly payment.
    Loan {
        #[arg(value_parser = parse_decimal)]
        principal: Decimal,

        /// Annual interest rate, in percent.
        #[arg(value_parser = parse_decimal)]
        rate: Decimal,

        /// Term in years.
        years: u32,

        /// Extra amount paid each month.
        #[arg(long, value_parser = parse_decimal, default_value = "0")]
        extra: Decimal,
    },

    /// Savings trajectory toward a target.
    Savings(SavingsArgs),

    /// Rental, vacancy, exchange-rate and foreign-income sweeps.
    Sensitivity,

    /// Inspect or change the saved input record.
    #[command(subcommand)]
    Snapshot(SnapshotCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Flat and compounding balances at fixed milestones.
    Milestones,
    /// Month-by-month real return after inflation, from a zero balance.
    Inflation,
}

/// Amounts left out are taken from the current input's consolidated result.
#[derive(Debug, Args)]
pub struct SavingsArgs {
    #[arg(long, value_enum, default_value_t = StrategyArg::Milestones)]
    pub strategy: StrategyArg,

    #[arg(long, value_parser = parse_decimal)]
    pub current: Option<Decimal>,

    #[arg(long, value_parser = parse_decimal)]
    pub target: Option<Decimal>,

    #[arg(long, value_parser = parse_decimal)]
    pub monthly: Option<Decimal>,

    /// Annual return, in percent.
    #[arg(long = "return", value_parser = parse_decimal)]
    pub annual_return: Option<Decimal>,

    /// Annual inflation, in percent (inflation strategy only).
    #[arg(long, value_parser = parse_decimal)]
    pub inflation: Option<Decimal>,
}

#[derive(Debug, Subcommand)]
pub enum SnapshotCommand {
    /// Print the saved input record.
    Show,
    /// Save the current input (`--input` or the default record).
    Save,
    /// Delete the saved input record.
    Reset,
}
