//! Configuration management for Larder

pub mod schema;

pub use schema::Config;

use crate::error::{LarderError, LarderResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Name of the project-local config file discovered by walking up
pub const LOCAL_CONFIG_NAME: &str = ".larder.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("larder")
            .join("config.toml")
    }

    /// Get the state directory path
    pub fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("larder")
    }

    /// Get the cache store root directory
    pub fn store_dir() -> PathBuf {
        Self::state_dir().join("store")
    }

    /// Find a project-local `.larder.toml` by walking up from `start`
    pub fn find_local_config(start: &Path) -> Option<PathBuf> {
        let mut dir = Some(start);
        while let Some(current) = dir {
            let candidate = current.join(LOCAL_CONFIG_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            dir = current.parent();
        }
        None
    }

    /// Load configuration, creating default if not exists
    pub async fn load(&self) -> LarderResult<Config> {
        if !self.config_path.exists() {
            debug!("config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> LarderResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| LarderError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| LarderError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load the global config with a project-local overlay applied.
    ///
    /// Local values win per key; sections missing from the local file
    /// keep their global (or default) values.
    pub async fn load_merged(&self, local: Option<&Path>) -> LarderResult<Config> {
        let global = self.load().await?;
        let Some(local_path) = local else {
            return Ok(global);
        };

        let content = fs::read_to_string(local_path).await.map_err(|e| {
            LarderError::io(format!("reading local config {}", local_path.display()), e)
        })?;
        let overlay: toml::Value =
            toml::from_str(&content).map_err(|e| LarderError::ConfigInvalid {
                path: local_path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut merged = toml::Value::try_from(&global)?;
        merge_value(&mut merged, overlay);

        merged.try_into().map_err(|e: toml::de::Error| {
            LarderError::ConfigInvalid {
                path: local_path.to_path_buf(),
                reason: e.to_string(),
            }
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> LarderResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            LarderError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> LarderResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| LarderError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursively overlay `overlay` onto `base`, table by table
fn merge_value(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(slot) => merge_value(slot, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
