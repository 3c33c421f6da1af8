use clap::Parser;
use tracing::debug;

use property_cli::app;
use property_cli::cli::Cli;
use property_cli::logging;

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let cli = Cli::parse();

    if cli.verbose {
        logging::set_log_level("debug")?;
    }
    if let Some(path) = &cli.log_file {
        logging::enable_file_logging(path)?;
    }

    debug!(command = ?cli.command, "running");
    let output = app::run(&cli, app::today()).await?;
    println!("{output}");

    Ok(())
}
