//! Activate phase: promote staged files and invalidate stale entries
//!
//! On first install the content cache is rebuilt from scratch. On an
//! upgrade, entries whose fingerprint is unchanged between the applied
//! and the new manifest survive; everything else is evicted before the
//! staged core files are promoted on top.
//!
//! Any failure mid-activation clears all three stores. A partially
//! applied cache is strictly worse than an empty one: staleness in it
//! would be undetectable.

use crate::error::{LarderError, LarderResult};
use crate::manifest::{Manifest, ROOT_KEY};
use crate::worker::{LifecycleState, Worker};
use tracing::{error, info};

/// What an activation did, for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationReport {
    /// No applied manifest existed; content was rebuilt from scratch
    pub first_install: bool,
    /// Entries kept because their fingerprint was unchanged
    pub preserved: usize,
    /// Entries evicted as removed or fingerprint-changed
    pub evicted: usize,
    /// Staged entries promoted into content
    pub promoted: usize,
}

impl Worker {
    /// Apply the current manifest, promoting staged files into content.
    ///
    /// On success the worker claims all open clients and becomes the
    /// controller. On failure every store is cleared and the system
    /// returns to a never-installed state.
    pub async fn activate(&mut self) -> LarderResult<ActivationReport> {
        self.state = LifecycleState::Activating;

        match self.apply_manifest().await {
            Ok(report) => {
                self.state = LifecycleState::Active;
                self.claim();
                info!(
                    first_install = report.first_install,
                    preserved = report.preserved,
                    evicted = report.evicted,
                    promoted = report.promoted,
                    "activation complete"
                );
                Ok(report)
            }
            Err(e) => {
                error!("failed to activate worker: {e}");
                if let Err(reset_err) = self.stores.clear_all().await {
                    error!("reset after failed activation also failed: {reset_err}");
                }
                self.state = LifecycleState::New;
                Err(LarderError::ActivateFailed(e.to_string()))
            }
        }
    }

    async fn apply_manifest(&self) -> LarderResult<ActivationReport> {
        let content = &self.stores.content;
        let staging = &self.stores.staging;

        let applied = self.stores.applied_manifest().await?;

        let (first_install, preserved, evicted) = match applied {
            None => {
                // No prior manifest: rebuild content from a clean slate
                content.clear().await?;
                (true, 0, 0)
            }
            Some(old) => {
                let mut preserved = 0;
                let mut evicted = 0;
                for url in content.keys().await? {
                    if self.keep_entry(&url, &old) {
                        preserved += 1;
                    } else {
                        content.delete(&url).await?;
                        evicted += 1;
                    }
                }
                (false, preserved, evicted)
            }
        };

        // Promote staged core files, overwriting any survivors so core
        // files are always the freshly fetched copies.
        let mut promoted = 0;
        for url in staging.keys().await? {
            if let Some(response) = staging.get(&url).await? {
                content.put(&url, response).await?;
                promoted += 1;
            }
        }
        staging.clear().await?;

        // Record the manifest so the next upgrade can diff against it
        self.stores.record_manifest(&self.manifest).await?;

        Ok(ActivationReport {
            first_install,
            preserved,
            evicted,
            promoted,
        })
    }

    /// Whether a content entry survives the upgrade: its key must still
    /// be in the new manifest with the fingerprint the old applied
    /// manifest recorded. Entries outside the origin never survive.
    fn keep_entry(&self, url: &str, old: &Manifest) -> bool {
        let Some(rest) = url.strip_prefix(&self.origin) else {
            return false;
        };
        let rest = rest.strip_prefix('/').unwrap_or(rest);
        let key = if rest.is_empty() { ROOT_KEY } else { rest };

        let Some(canonical) = self.manifest.match_key(key) else {
            return false;
        };
        self.manifest.fingerprint(canonical) == old.fingerprint(canonical)
    }
}
