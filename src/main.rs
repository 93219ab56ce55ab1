//! Larder - Offline-first asset cache worker
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use larder::cli::{Cli, Commands};
use larder::config::ConfigManager;
use larder::error::LarderResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> LarderResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("larder=warn"),
        1 => EnvFilter::new("larder=info"),
        _ => EnvFilter::new("larder=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    // Init command doesn't need config loading
    if let Commands::Init(args) = cli.command {
        return larder::cli::commands::init(args).await;
    }

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    // Find local config unless --no-local is set
    let local_config_path = if cli.no_local {
        debug!("local config discovery disabled (--no-local)");
        None
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| larder::error::LarderError::io("getting current directory", e))?;
        let found = ConfigManager::find_local_config(&cwd);
        if let Some(ref path) = found {
            debug!("found local config: {}", path.display());
        }
        found
    };

    let config = config_manager
        .load_merged(local_config_path.as_deref())
        .await?;

    // Dispatch to command
    match cli.command {
        Commands::Init(_) => unreachable!("Init handled above"),
        Commands::Sync(args) => larder::cli::commands::sync(args, &config).await,
        Commands::Get(args) => larder::cli::commands::get(args, &config).await,
        Commands::Download(args) => larder::cli::commands::download(args, &config).await,
        Commands::Status(args) => larder::cli::commands::status(args, &config).await,
        Commands::Reset(args) => larder::cli::commands::reset(args, &config).await,
        Commands::Config(args) => larder::cli::commands::config(args, &config).await,
    }
}
