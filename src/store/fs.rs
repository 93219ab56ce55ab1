//! Filesystem-backed cache store
//!
//! Each named store is a directory under the state root. An entry is a
//! pair of files named after the SHA256 digest of its key: a JSON
//! metadata sidecar and the raw body bytes.

use crate::error::{LarderError, LarderResult};
use crate::store::{CacheStore, StoredResponse};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

const META_EXT: &str = "meta.json";
const BODY_EXT: &str = "body";

/// Entry metadata persisted next to the body file
#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    url: String,
    status: u16,
    content_type: Option<String>,
    stored_at: DateTime<Utc>,
    body_len: usize,
}

/// Persistent cache store rooted at `<dir>/<name>/`
pub struct FsStore {
    name: String,
    dir: PathBuf,
}

impl FsStore {
    /// Open (creating if needed) the store directory for `name`
    pub async fn open(root: &Path, name: &str) -> LarderResult<Self> {
        let dir = root.join(name);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| LarderError::io(format!("creating store directory {}", dir.display()), e))?;

        Ok(Self {
            name: name.to_string(),
            dir,
        })
    }

    /// Digest a key into a stable filename stem
    fn stem(key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn meta_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{META_EXT}", Self::stem(key)))
    }

    fn body_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{BODY_EXT}", Self::stem(key)))
    }

    fn corrupt(&self, reason: impl Into<String>) -> LarderError {
        LarderError::StoreCorrupt {
            name: self.name.clone(),
            reason: reason.into(),
        }
    }

    async fn read_meta(&self, path: &Path) -> LarderResult<EntryMeta> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| LarderError::io(format!("reading {}", path.display()), e))?;
        serde_json::from_str(&content).map_err(|e| self.corrupt(format!("{}: {e}", path.display())))
    }
}

#[async_trait]
impl CacheStore for FsStore {
    async fn get(&self, key: &str) -> LarderResult<Option<StoredResponse>> {
        let meta_path = self.meta_path(key);
        if !meta_path.exists() {
            return Ok(None);
        }

        let meta = self.read_meta(&meta_path).await?;
        let body = fs::read(self.body_path(key))
            .await
            .map_err(|e| self.corrupt(format!("missing body for {key}: {e}")))?;

        if body.len() != meta.body_len {
            return Err(self.corrupt(format!(
                "body length mismatch for {key}: expected {}, found {}",
                meta.body_len,
                body.len()
            )));
        }

        Ok(Some(StoredResponse {
            url: meta.url,
            status: meta.status,
            content_type: meta.content_type,
            body,
            stored_at: meta.stored_at,
        }))
    }

    async fn put(&self, key: &str, response: StoredResponse) -> LarderResult<()> {
        let meta = EntryMeta {
            url: response.url.clone(),
            status: response.status,
            content_type: response.content_type.clone(),
            stored_at: response.stored_at,
            body_len: response.body.len(),
        };

        let body_path = self.body_path(key);
        fs::write(&body_path, &response.body)
            .await
            .map_err(|e| LarderError::io(format!("writing {}", body_path.display()), e))?;

        let meta_path = self.meta_path(key);
        let content = serde_json::to_string(&meta)?;
        fs::write(&meta_path, content)
            .await
            .map_err(|e| LarderError::io(format!("writing {}", meta_path.display()), e))?;

        debug!(store = %self.name, key, "stored entry");
        Ok(())
    }

    async fn delete(&self, key: &str) -> LarderResult<bool> {
        let meta_path = self.meta_path(key);
        if !meta_path.exists() {
            return Ok(false);
        }

        fs::remove_file(&meta_path)
            .await
            .map_err(|e| LarderError::io(format!("deleting {}", meta_path.display()), e))?;

        let body_path = self.body_path(key);
        if body_path.exists() {
            fs::remove_file(&body_path)
                .await
                .map_err(|e| LarderError::io(format!("deleting {}", body_path.display()), e))?;
        }

        Ok(true)
    }

    async fn keys(&self) -> LarderResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut dir = fs::read_dir(&self.dir)
            .await
            .map_err(|e| LarderError::io(format!("listing {}", self.dir.display()), e))?;

        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| LarderError::io(format!("listing {}", self.dir.display()), e))?
        {
            let path = entry.path();
            if path.to_string_lossy().ends_with(META_EXT) {
                let meta = self.read_meta(&path).await?;
                keys.push(meta.url);
            }
        }

        Ok(keys)
    }

    async fn clear(&self) -> LarderResult<()> {
        fs::remove_dir_all(&self.dir)
            .await
            .map_err(|e| LarderError::io(format!("clearing {}", self.dir.display()), e))?;
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| LarderError::io(format!("recreating {}", self.dir.display()), e))?;

        debug!(store = %self.name, "cleared store");
        Ok(())
    }

    async fn len(&self) -> LarderResult<usize> {
        Ok(self.keys().await?.len())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
