//! Resource manifest model
//!
//! A manifest maps logical asset paths to content fingerprints for one
//! build of the application bundle. Same fingerprint = same content, so
//! unchanged assets survive an upgrade without a re-download.

use crate::error::{LarderError, LarderResult};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Logical key of the entry document
pub const ROOT_KEY: &str = "/";

/// Immutable mapping from logical path to content fingerprint.
///
/// Loaded once at startup and passed by value into the worker; never a
/// process-global. Keys are forward-slash separated paths without a
/// leading slash, except entry-document aliases which start with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    entries: BTreeMap<String, String>,
}

impl Manifest {
    /// Parse a manifest from its serialized JSON object form
    pub fn parse(content: &str) -> LarderResult<Self> {
        let entries: BTreeMap<String, String> =
            serde_json::from_str(content).map_err(|e| LarderError::ManifestParse(e.to_string()))?;

        if entries.keys().any(|k| k.is_empty()) {
            return Err(LarderError::ManifestParse(
                "manifest contains an empty key".to_string(),
            ));
        }

        Ok(Self { entries })
    }

    /// Load a manifest from a JSON file on disk
    pub async fn from_file(path: &Path) -> LarderResult<Self> {
        if !path.exists() {
            return Err(LarderError::ManifestNotFound(path.to_path_buf()));
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LarderError::io(format!("reading manifest {}", path.display()), e))?;

        let manifest = Self::parse(&content)?;
        debug!("Loaded manifest with {} entries", manifest.len());
        Ok(manifest)
    }

    /// Serialize back to the JSON object form used in the manifest record
    pub fn to_json(&self) -> LarderResult<String> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    /// Fingerprint recorded for a logical key, if any
    pub fn fingerprint(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether the manifest carries the entry-document alias
    pub fn has_root(&self) -> bool {
        self.entries.contains_key(ROOT_KEY)
    }

    /// Resolve a normalized request key to its canonical manifest key.
    ///
    /// Asset keys match exactly. A key may also match its `/`-prefixed
    /// form: those entries are entry-document routes (deep links into the
    /// application shell) and are served online-first like the root.
    pub fn match_key(&self, key: &str) -> Option<&str> {
        if let Some((canonical, _)) = self.entries.get_key_value(key) {
            return Some(canonical);
        }
        if !key.starts_with('/') {
            let aliased = format!("/{key}");
            if let Some((canonical, _)) = self.entries.get_key_value(aliased.as_str()) {
                return Some(canonical);
            }
        }
        None
    }

    /// Iterate logical keys in deterministic order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether a canonical manifest key names the entry document or one of
/// its route aliases, which are served online-first.
pub fn is_entry_key(key: &str) -> bool {
    key.starts_with('/')
}

/// Ordered set of paths that must be cached before the worker is ready
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreSet {
    paths: Vec<String>,
}

impl CoreSet {
    /// Build a core set, validating every path against the manifest
    pub fn new(paths: Vec<String>, manifest: &Manifest) -> LarderResult<Self> {
        for path in &paths {
            if manifest.fingerprint(path).is_none() {
                return Err(LarderError::CoreNotInManifest(path.clone()));
            }
        }
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Compute the logical key of a request URL relative to an origin.
///
/// Strips the origin and its trailing separator; a `?v=` cache-busting
/// suffix is removed before lookup. The origin root, a bare `#`-fragment
/// URL, and an empty remainder all normalize to `"/"`. Returns `None`
/// for URLs outside the origin, which are never intercepted.
pub fn logical_key(origin: &str, url: &str) -> Option<String> {
    let rest = url.strip_prefix(origin)?;
    let rest = rest.strip_prefix('/').unwrap_or(rest);

    let mut key = match rest.find("?v=") {
        Some(idx) => rest[..idx].to_string(),
        None => rest.to_string(),
    };

    if key.is_empty() || key.starts_with('#') {
        key = ROOT_KEY.to_string();
    }

    Some(key)
}
