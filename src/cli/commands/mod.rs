//! CLI parser and command dispatch.

mod config_cmd;
mod run;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use govlinks::Config;

use run::RunArgs;

#[derive(Parser)]
#[command(name = "govlinks")]
#[command(about = "Find public-sector web pages that mention catalog titles")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true, env = "GOVLINKS_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Load catalog titles, search them, and write matching links
    Run(RunArgs),

    /// Inspect or create configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,

    /// Write a default configuration file
    Init {
        /// Destination (default: govlinks.toml)
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let config = load_config(cli.config.as_deref()).await?;
            run::cmd_run(config, &args).await
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let config = load_config(cli.config.as_deref()).await?;
                config_cmd::cmd_config_show(&config)
            }
            ConfigCommands::Init { path, force } => {
                config_cmd::cmd_config_init(path.as_deref(), force).await
            }
        },
    }
}

async fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    let config = Config::load(path)
        .await
        .context("Failed to load configuration")?;
    if let Some(source) = &config.source_path {
        tracing::debug!("Using config file {}", source.display());
    }
    Ok(config)
}
