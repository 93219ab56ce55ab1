//! Named cache stores for staged asset promotion
//!
//! Three independent key-value stores back the worker:
//!
//! | Store | Name | Role |
//! |-------|------|------|
//! | Staging | `staging` | Populated at install, drained at activate |
//! | Content | `content` | Serving cache, survives across versions |
//! | Record | `manifest` | Holds the last-applied manifest snapshot |
//!
//! Entries are keyed by request identity. Only GET responses are ever
//! stored, so the request URL is the identity.

pub mod fs;
pub mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use crate::error::LarderResult;
use crate::manifest::Manifest;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Fixed store names
pub mod names {
    /// Staging store, filled during install
    pub const STAGING: &str = "staging";
    /// Content store, the serving cache
    pub const CONTENT: &str = "content";
    /// Manifest-record store
    pub const RECORD: &str = "manifest";
}

/// Fixed key of the applied-manifest entry inside the record store
pub const RECORD_KEY: &str = "manifest";

/// A cached response blob with its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    /// Request URL this response was fetched for
    pub url: String,

    /// HTTP status code
    pub status: u16,

    /// Content type, when the server sent one
    pub content_type: Option<String>,

    /// Response body bytes
    pub body: Vec<u8>,

    /// When the response was stored
    pub stored_at: DateTime<Utc>,
}

impl StoredResponse {
    /// Create a response stamped with the current time
    pub fn new(
        url: impl Into<String>,
        status: u16,
        content_type: Option<String>,
        body: Vec<u8>,
    ) -> Self {
        Self {
            url: url.into(),
            status,
            content_type,
            body,
            stored_at: Utc::now(),
        }
    }

    /// Whether the response carries a success status
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstract key-value response store
///
/// Implemented by [`MemoryStore`] for tests and ephemeral runs and by
/// [`FsStore`] for the persistent on-disk mirror.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a response by request URL
    async fn get(&self, key: &str) -> LarderResult<Option<StoredResponse>>;

    /// Store a response under a request URL, overwriting any previous entry
    async fn put(&self, key: &str, response: StoredResponse) -> LarderResult<()>;

    /// Remove one entry; returns whether it existed
    async fn delete(&self, key: &str) -> LarderResult<bool>;

    /// All keys currently present
    async fn keys(&self) -> LarderResult<Vec<String>>;

    /// Remove every entry
    async fn clear(&self) -> LarderResult<()>;

    /// Number of entries present
    async fn len(&self) -> LarderResult<usize>;

    /// The store's fixed name
    fn name(&self) -> &str;
}

/// The three named stores opened together and shared with every handler
#[derive(Clone)]
pub struct StoreSet {
    pub staging: Arc<dyn CacheStore>,
    pub content: Arc<dyn CacheStore>,
    pub record: Arc<dyn CacheStore>,
}

impl StoreSet {
    /// Open an in-memory store set
    pub fn in_memory() -> Self {
        Self {
            staging: Arc::new(MemoryStore::new(names::STAGING)),
            content: Arc::new(MemoryStore::new(names::CONTENT)),
            record: Arc::new(MemoryStore::new(names::RECORD)),
        }
    }

    /// Open a filesystem-backed store set rooted at `dir`
    pub async fn on_disk(dir: &Path) -> LarderResult<Self> {
        Ok(Self {
            staging: Arc::new(FsStore::open(dir, names::STAGING).await?),
            content: Arc::new(FsStore::open(dir, names::CONTENT).await?),
            record: Arc::new(FsStore::open(dir, names::RECORD).await?),
        })
    }

    /// Read the applied manifest from the record store, if one exists
    pub async fn applied_manifest(&self) -> LarderResult<Option<Manifest>> {
        let Some(entry) = self.record.get(RECORD_KEY).await? else {
            return Ok(None);
        };

        let body = String::from_utf8(entry.body)
            .map_err(|e| crate::error::LarderError::StoreCorrupt {
                name: names::RECORD.to_string(),
                reason: format!("manifest record is not UTF-8: {e}"),
            })?;

        Ok(Some(Manifest::parse(&body)?))
    }

    /// Overwrite the applied-manifest record with `manifest`
    pub async fn record_manifest(&self, manifest: &Manifest) -> LarderResult<()> {
        let body = manifest.to_json()?.into_bytes();
        let entry = StoredResponse::new(
            RECORD_KEY,
            200,
            Some("application/json".to_string()),
            body,
        );
        self.record.put(RECORD_KEY, entry).await
    }

    /// Clear all three stores — the explicit reset-to-empty recovery action
    pub async fn clear_all(&self) -> LarderResult<()> {
        self.content.clear().await?;
        self.staging.clear().await?;
        self.record.clear().await?;
        Ok(())
    }
}
