//! Vaultkeep CLI entry point.

use clap::Parser;
use vaultkeep_cli::{init_logging, run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = vaultkeep_cli::load_config(cli.config.as_deref())?;
    init_logging(&config.logging, cli.verbose);

    run(cli, config).await
}
