//! Vaultkeep command-line interface.

pub mod commands;
pub mod session;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vaultkeep_core::config::LoggingConfig;
use vaultkeep_core::env::{self, vars};
use vaultkeep_core::Config;

/// Vaultkeep - personal credential vault
#[derive(Parser)]
#[command(name = "vaultkeep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "VAULTKEEP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// File holding the hex-encoded master key (defaults to $VAULTKEEP_MASTER_KEY)
    #[arg(long, global = true)]
    pub key_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a random password
    Generate(commands::generate::GenerateArgs),

    /// Add a credential
    Add(commands::credentials::AddArgs),

    /// List credentials, optionally filtered
    List(commands::credentials::ListArgs),

    /// Decrypt and print a credential's password
    Reveal {
        /// Credential id
        id: String,
    },

    /// Edit a credential
    Edit(commands::credentials::EditArgs),

    /// Delete a credential
    Remove {
        /// Credential id
        id: String,
    },

    /// List the categories in use
    Categories,

    /// Create a new random master key and print it once
    Keygen,

    /// Show version information
    Version,
}

/// Load configuration from `path`, or from the default location with fallback to defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => {
            let mut config = Config::load(path)?;
            config.apply_env_overrides();
            config
        }
        None => Config::load_or_default()?,
    };
    config.validate()?;
    Ok(config)
}

/// Install the global tracing subscriber.
///
/// Precedence: `VAULTKEEP_LOG`, then `-v` flags, then the configured level.
pub fn init_logging(logging: &LoggingConfig, verbose: u8) {
    let directive = match verbose {
        0 => format!("vaultkeep={}", logging.level.to_lowercase()),
        1 => "vaultkeep=debug".to_string(),
        _ => "vaultkeep=trace".to_string(),
    };
    let filter = env::get_var(vars::VAULTKEEP_LOG)
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new(directive));

    // A subscriber may already be installed (tests); keep it.
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .ok();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .ok();
    }
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let key_file = cli.key_file;
    match cli.command {
        Commands::Generate(args) => commands::generate::run(args, &config),
        Commands::Add(args) => commands::credentials::add(args, &config, key_file.as_deref()).await,
        Commands::List(args) => commands::credentials::list(args, &config).await,
        Commands::Reveal { id } => {
            commands::credentials::reveal(&id, &config, key_file.as_deref()).await
        }
        Commands::Edit(args) => {
            commands::credentials::edit(args, &config, key_file.as_deref()).await
        }
        Commands::Remove { id } => commands::credentials::remove(&id, &config).await,
        Commands::Categories => commands::credentials::categories(&config).await,
        Commands::Keygen => commands::generate::keygen(),
        Commands::Version => {
            println!("vaultkeep {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
