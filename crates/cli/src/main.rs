//! Stagehand CLI, the main entry point.
//!
//! Commands:
//! - `run`     Run the site-builder pipeline on a message
//! - `models`  List models a backend serves
//! - `config`  Show the effective configuration

use clap::{Parser, Subcommand};
use stagehand_config::{AppConfig, BackendKind};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "stagehand",
    about = "Stagehand: run chains of model-backed agent stages",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.stagehand/config.toml)
    #[arg(short, long, global = true, env = "STAGEHAND_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the site-builder pipeline and print the result set as JSON
    Run {
        /// The request to start the pipeline with
        message: String,

        /// Backend to use (overrides `pipeline.backend`)
        #[arg(short, long)]
        backend: Option<BackendKind>,

        /// Where to write the generated code (overrides `pipeline.artifact_path`)
        #[arg(short, long)]
        artifact: Option<PathBuf>,

        /// Model for every agent stage (default: the backend's `default_model`)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List the models a backend serves
    Models {
        #[arg(short, long)]
        backend: Option<BackendKind>,
    },

    /// Show the effective configuration
    Config {
        /// Print the built-in defaults as TOML instead
        #[arg(long)]
        default: bool,

        /// Print the config file path
        #[arg(long, conflicts_with = "default")]
        path: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    };
    config.map_err(|e| format!("Failed to load config: {e}").into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::Config { default: true, .. } = cli.command {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let config = load_config(cli.config.as_ref())?;

    // RUST_LOG wins, then --verbose, then the configured level
    let filter = if cli.verbose { "debug" } else { config.log_level.as_str() };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            message,
            backend,
            artifact,
            model,
        } => {
            let opts = commands::run::RunOptions {
                backend,
                artifact,
                model,
            };
            commands::run::run(&config, &message, opts).await?
        }
        Commands::Models { backend } => commands::models::run(&config, backend).await?,
        Commands::Config { path, .. } => {
            let config_path = cli
                .config
                .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"));
            if path {
                commands::config_cmd::path(&config_path)
            } else {
                commands::config_cmd::show(&config)?
            }
        }
    }

    Ok(())
}
