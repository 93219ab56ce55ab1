//! Configuration schema for Larder
//!
//! Configuration is stored at `~/.config/larder/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Worker settings
    pub worker: WorkerConfig,

    /// Store settings
    pub store: StoreConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// Worker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Deployment origin the manifest paths resolve against
    pub origin: String,

    /// Path to the build's resource manifest JSON
    pub manifest_path: Option<PathBuf>,

    /// Core set: paths staged during install, in order
    pub core: Vec<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8080".to_string(),
            manifest_path: None,
            core: vec![],
        }
    }
}

/// Store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Persistent filesystem stores under the state directory
    Fs,
    /// Ephemeral in-memory stores
    Memory,
}

/// Cache store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend to open the three named stores on
    pub backend: StoreBackend,

    /// Store root directory (defaults to the state directory)
    pub dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Fs,
            dir: None,
        }
    }
}
