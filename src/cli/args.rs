//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Larder - Offline-first asset cache worker
///
/// Mirrors a compiled web-application bundle into a local cache and
/// serves it offline-first, with selective invalidation across builds.
#[derive(Parser, Debug)]
#[command(name = "larder")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "LARDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Skip local .larder.toml discovery
    #[arg(long, global = true)]
    pub no_local: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one install + activate upgrade cycle
    Sync(SyncArgs),

    /// Serve one resource through the cache policies
    Get(GetArgs),

    /// Download every manifest entry missing from the cache
    Download(DownloadArgs),

    /// Show worker, store and applied-manifest state
    Status(StatusArgs),

    /// Clear all cache stores (the recovery action)
    Reset(ResetArgs),

    /// Initialize a project-local .larder.toml config
    Init(InitArgs),

    /// Show configuration
    Config(ConfigArgs),
}

/// Config values overridable per invocation
#[derive(Parser, Debug, Default)]
pub struct OverrideArgs {
    /// Resource manifest JSON path
    #[arg(long, env = "LARDER_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Deployment origin, e.g. https://app.example.com
    #[arg(long, env = "LARDER_ORIGIN")]
    pub origin: Option<String>,

    /// Cache store root directory
    #[arg(long)]
    pub store_dir: Option<PathBuf>,

    /// Use ephemeral in-memory stores
    #[arg(long)]
    pub memory: bool,
}

/// Arguments for the sync command
#[derive(Parser, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// Arguments for the get command
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Logical resource path (e.g. main.js, or / for the entry document)
    pub path: String,

    /// Write the body to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// Arguments for the download command
#[derive(Parser, Debug)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// Arguments for the status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// Arguments for the reset command
#[derive(Parser, Debug)]
pub struct ResetArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Overwrite existing .larder.toml
    #[arg(short, long)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}
