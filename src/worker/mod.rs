//! The cache worker state machine
//!
//! A passive, event-driven cache manager with four entry points:
//! [`Worker::install`], [`Worker::activate`], [`Worker::handle_fetch`]
//! and [`Worker::handle_message`]. The driver guarantees ordering:
//! install completes before activate, activate completes before fetches
//! are dispatched to this worker version.
//!
//! Correctness after a crash relies on idempotence, not locks: re-running
//! install or activate always lands in an empty or fully-applied state,
//! never a torn one, because activation failure clears every store.

pub mod activate;
pub mod factory;
pub mod install;
pub mod serve;

pub use activate::ActivationReport;
pub use serve::Served;

use crate::error::{LarderError, LarderResult};
use crate::fetch::{FetchMode, Fetcher, ResourceRequest};
use crate::manifest::{CoreSet, Manifest, ROOT_KEY};
use crate::store::StoreSet;
use futures_util::future::try_join_all;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Lifecycle state of a worker version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Not yet installed (or rolled back after a failure)
    New,
    /// Core set download in progress
    Installing,
    /// Core set staged, waiting to activate
    Installed,
    /// Manifest application in progress
    Activating,
    /// Controlling: fetches are served from this version's caches
    Active,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::New => "new",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Active => "active",
        };
        write!(f, "{}", name)
    }
}

/// Recognized inbound commands; anything else is ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Force a waiting worker version to activate
    SkipWaiting,
    /// Best-effort background fill of every missing manifest entry
    DownloadOffline,
}

impl Command {
    /// Parse a raw message value; unknown values yield `None`
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "skipWaiting" => Some(Self::SkipWaiting),
            "downloadOffline" => Some(Self::DownloadOffline),
            _ => None,
        }
    }
}

/// What a message handler did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Message was not a recognized command
    Ignored,
    /// Waiting state will be skipped
    SkipWaiting,
    /// Offline fill fetched this many resources
    Downloaded(usize),
}

/// The cache manager.
///
/// Holds the injected manifest and collaborators; the store handles are
/// shared `Arc`s passed by reference into each handler, so there is no
/// hidden shared mutable state beyond the stores themselves.
pub struct Worker {
    manifest: Manifest,
    core: CoreSet,
    origin: String,
    fetcher: Arc<dyn Fetcher>,
    stores: StoreSet,
    state: LifecycleState,
    skip_waiting: bool,
    claimed: bool,
}

impl Worker {
    /// Create a worker over an immutable manifest snapshot.
    ///
    /// Validates that the origin looks like an HTTP origin and that the
    /// manifest carries the `"/"` root alias.
    pub fn new(
        manifest: Manifest,
        core: CoreSet,
        origin: &str,
        fetcher: Arc<dyn Fetcher>,
        stores: StoreSet,
    ) -> LarderResult<Self> {
        let origin = origin.trim_end_matches('/');
        if !origin.starts_with("http://") && !origin.starts_with("https://") {
            return Err(LarderError::OriginInvalid {
                origin: origin.to_string(),
                reason: "expected an http(s) origin".to_string(),
            });
        }

        if !manifest.has_root() {
            return Err(LarderError::ManifestMissingRoot);
        }

        Ok(Self {
            manifest,
            core,
            origin: origin.to_string(),
            fetcher,
            stores,
            state: LifecycleState::New,
            skip_waiting: false,
            claimed: false,
        })
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Whether this version has claimed the open clients
    pub fn is_claimed(&self) -> bool {
        self.claimed
    }

    /// Leave the waiting lifecycle state as soon as install finishes
    pub fn skip_waiting(&mut self) {
        if !self.skip_waiting {
            debug!("skip_waiting requested");
        }
        self.skip_waiting = true;
    }

    /// Claim all open clients so the very first load is served from cache
    pub(crate) fn claim(&mut self) {
        self.claimed = true;
        info!("claimed clients, worker is controlling");
    }

    /// Absolute URL for a logical manifest key
    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.origin, key.trim_start_matches('/'))
    }

    /// Handle an inbound message.
    ///
    /// Unrecognized values are ignored. Errors from the offline fill
    /// propagate to the message sender but never affect serving.
    pub async fn handle_message(&mut self, raw: &str) -> LarderResult<MessageOutcome> {
        match Command::parse(raw) {
            None => {
                debug!(message = raw, "ignoring unrecognized message");
                Ok(MessageOutcome::Ignored)
            }
            Some(Command::SkipWaiting) => {
                self.skip_waiting();
                Ok(MessageOutcome::SkipWaiting)
            }
            Some(Command::DownloadOffline) => {
                let fetched = self.download_offline().await?;
                Ok(MessageOutcome::Downloaded(fetched))
            }
        }
    }

    /// Fetch and store every manifest entry not already in the content
    /// cache. Returns how many resources were downloaded.
    pub async fn download_offline(&self) -> LarderResult<usize> {
        self.download_offline_with(|_| {}).await
    }

    /// As [`Self::download_offline`], reporting each stored key to `on_done`
    pub async fn download_offline_with<F>(&self, on_done: F) -> LarderResult<usize>
    where
        F: Fn(&str) + Send + Sync,
    {
        let content = &self.stores.content;

        let mut present: HashSet<&str> = HashSet::new();
        for url in content.keys().await? {
            if let Some(key) = self.canonical_key_of(&url) {
                present.insert(key);
            }
        }

        let missing: Vec<&str> = self
            .manifest
            .keys()
            .filter(|key| !present.contains(key))
            .collect();

        info!(
            missing = missing.len(),
            cached = present.len(),
            "starting offline fill"
        );

        let on_done = &on_done;
        let fetches = missing.iter().copied().map(|key| {
            let url = self.url_for(key);
            async move {
                let request = ResourceRequest::get(&url);
                let response = self.fetcher.fetch(&request, FetchMode::Default).await?;
                if !response.is_ok() {
                    return Err(LarderError::FetchStatus {
                        url,
                        status: response.status,
                    });
                }
                content.put(&request.url, response).await?;
                on_done(key);
                Ok(())
            }
        });

        try_join_all(fetches).await?;
        Ok(missing.len())
    }

    /// Canonical manifest key for a cached entry's URL, if it has one
    fn canonical_key_of(&self, url: &str) -> Option<&str> {
        let rest = url.strip_prefix(&self.origin)?;
        let rest = rest.strip_prefix('/').unwrap_or(rest);
        let key = if rest.is_empty() { ROOT_KEY } else { rest };
        self.manifest.match_key(key)
    }
}


#[cfg(test)]
mod tests {
    use super::testutil::*;
    use super::*;
    use crate::store::StoredResponse;

    const MANIFEST: &str = r#"{"/": "h0", "index.html": "h0", "main.js": "h1", "app.css": "h2"}"#;

    #[test]
    fn command_parse_recognized() {
        assert_eq!(Command::parse("skipWaiting"), Some(Command::SkipWaiting));
        assert_eq!(
            Command::parse("downloadOffline"),
            Some(Command::DownloadOffline)
        );
    }

    #[test]
    fn command_parse_unknown_is_none() {
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("SKIPWAITING"), None);
        assert_eq!(Command::parse("purge"), None);
    }

    #[test]
    fn new_rejects_bad_origin() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        let core = CoreSet::default();
        let result = Worker::new(
            manifest,
            core,
            "ftp://files.example.com",
            Arc::new(crate::fetch::FixtureFetcher::new()),
            StoreSet::in_memory(),
        );
        assert!(matches!(result, Err(LarderError::OriginInvalid { .. })));
    }

    #[test]
    fn new_rejects_manifest_without_root() {
        let manifest = Manifest::parse(r#"{"main.js": "h1"}"#).unwrap();
        let result = Worker::new(
            manifest,
            CoreSet::default(),
            ORIGIN,
            Arc::new(crate::fetch::FixtureFetcher::new()),
            StoreSet::in_memory(),
        );
        assert!(matches!(result, Err(LarderError::ManifestMissingRoot)));
    }

    #[test]
    fn origin_trailing_slash_is_normalized() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        let worker = Worker::new(
            manifest,
            CoreSet::default(),
            "https://app.example.com/",
            Arc::new(crate::fetch::FixtureFetcher::new()),
            StoreSet::in_memory(),
        )
        .unwrap();
        assert_eq!(worker.origin(), "https://app.example.com");
        assert_eq!(worker.url_for("main.js"), "https://app.example.com/main.js");
        assert_eq!(worker.url_for("/"), "https://app.example.com/");
    }

    #[tokio::test]
    async fn message_skip_waiting() {
        let (mut worker, _fetcher, _stores) = worker_with(MANIFEST, &[]);
        let outcome = worker.handle_message("skipWaiting").await.unwrap();
        assert_eq!(outcome, MessageOutcome::SkipWaiting);
    }

    #[tokio::test]
    async fn message_unknown_ignored() {
        let (mut worker, fetcher, _stores) = worker_with(MANIFEST, &[]);
        let outcome = worker.handle_message("flush").await.unwrap();
        assert_eq!(outcome, MessageOutcome::Ignored);
        assert!(fetcher.requests().await.is_empty());
    }

    #[tokio::test]
    async fn download_offline_fills_missing_entries() {
        let (mut worker, fetcher, stores) = worker_with(MANIFEST, &[]);
        serve_paths(
            &fetcher,
            &[
                ("/", b"<html>"),
                ("index.html", b"<html>"),
                ("main.js", b"js"),
                ("app.css", b"css"),
            ],
        )
        .await;

        // One entry already cached; it must not be re-fetched
        stores
            .content
            .put(
                "https://app.example.com/main.js",
                StoredResponse::new("https://app.example.com/main.js", 200, None, b"js".to_vec()),
            )
            .await
            .unwrap();

        let outcome = worker.handle_message("downloadOffline").await.unwrap();
        assert_eq!(outcome, MessageOutcome::Downloaded(3));
        assert_eq!(stores.content.len().await.unwrap(), 4);

        let fetched: Vec<String> = fetcher.requests().await.into_iter().map(|(u, _)| u).collect();
        assert!(!fetched.contains(&"https://app.example.com/main.js".to_string()));
    }

    #[tokio::test]
    async fn download_offline_propagates_failures() {
        let (worker, fetcher, _stores) = worker_with(MANIFEST, &[]);
        serve_paths(&fetcher, &[("/", b"x"), ("index.html", b"x"), ("app.css", b"x")]).await;
        fetcher.fail("https://app.example.com/main.js").await;

        let result = worker.download_offline().await;
        assert!(matches!(result, Err(LarderError::FetchFailed { .. })));
    }
}
