//! Error types for Larder
//!
//! All modules use `LarderResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Larder operations
pub type LarderResult<T> = Result<T, LarderError>;

/// All errors that can occur in Larder
#[derive(Error, Debug)]
pub enum LarderError {
    // Manifest errors
    #[error("Failed to parse resource manifest: {0}")]
    ManifestParse(String),

    #[error("Resource manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    #[error("No resource manifest configured")]
    ManifestUnset,

    #[error("Resource manifest has no root document alias \"/\"")]
    ManifestMissingRoot,

    #[error("Core path not present in manifest: {0}")]
    CoreNotInManifest(String),

    #[error("Invalid origin '{origin}': {reason}")]
    OriginInvalid { origin: String, reason: String },

    // Lifecycle errors
    #[error("Install failed: {0}")]
    InstallFailed(String),

    #[error("Activate failed, caches were reset: {0}")]
    ActivateFailed(String),

    // Fetch errors
    #[error("Fetch failed for {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Unexpected status {status} fetching {url}")]
    FetchStatus { url: String, status: u16 },

    // Store errors
    #[error("Corrupt cache entry in store '{name}': {reason}")]
    StoreCorrupt { name: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl LarderError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a fetch failure with URL context
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FetchFailed {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Check if error is retryable on the next sync cycle
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InstallFailed(_)
                | Self::ActivateFailed(_)
                | Self::FetchFailed { .. }
                | Self::FetchStatus { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ManifestNotFound(_) | Self::ManifestUnset => {
                Some("Pass --manifest or set worker.manifest_path in config")
            }
            Self::ActivateFailed(_) => Some("Run: larder sync"),
            Self::InstallFailed(_) => Some("Check the origin is reachable, then run: larder sync"),
            Self::OriginInvalid { .. } => Some("Set worker.origin to e.g. https://app.example.com"),
            _ => None,
        }
    }
}
