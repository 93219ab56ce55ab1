//! Install phase: stage the core set
//!
//! Runs once per worker version, before it may intercept any traffic.
//! Every core path is fetched with cache-bypass semantics so the staged
//! copies are guaranteed fresh, then stored in the staging cache for
//! activation to promote.

use crate::error::{LarderError, LarderResult};
use crate::fetch::{FetchMode, ResourceRequest};
use crate::worker::{LifecycleState, Worker};
use futures_util::future::try_join_all;
use tracing::{info, warn};

impl Worker {
    /// Download the core set into the staging cache.
    ///
    /// All core fetches must succeed; on any failure the worker stays
    /// uninstalled and the previous version keeps serving. The next sync
    /// cycle is the retry point. Returns the number of staged entries.
    pub async fn install(&mut self) -> LarderResult<usize> {
        // Take over immediately instead of waiting for idle clients
        self.skip_waiting();
        self.state = LifecycleState::Installing;
        info!(core = self.core.len(), "installing core set");

        let this = &*self;
        let staging = &this.stores.staging;
        let fetches = this.core.paths().iter().map(|path| {
            let url = this.url_for(path);
            async move {
                let request = ResourceRequest::get(&url);
                let response = this.fetcher.fetch(&request, FetchMode::Reload).await?;
                if !response.is_ok() {
                    return Err(LarderError::FetchStatus {
                        url,
                        status: response.status,
                    });
                }
                staging.put(&request.url, response).await
            }
        });

        let result = try_join_all(fetches).await;
        match result {
            Ok(staged) => {
                self.state = LifecycleState::Installed;
                info!(staged = staged.len(), "core set staged");
                Ok(staged.len())
            }
            Err(e) => {
                self.state = LifecycleState::New;
                warn!("install failed: {e}");
                Err(LarderError::InstallFailed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoredResponse;
    use crate::worker::testutil::*;

    const MANIFEST: &str = r#"{"/": "h0", "index.html": "h0", "main.js": "h1", "app.css": "h2"}"#;

    #[tokio::test]
    async fn install_stages_core_set() {
        let (mut worker, fetcher, stores) = worker_with(MANIFEST, &["index.html", "main.js"]);
        serve_paths(&fetcher, &[("index.html", b"<html>"), ("main.js", b"js")]).await;

        let staged = worker.install().await.unwrap();

        assert_eq!(staged, 2);
        assert_eq!(worker.state(), LifecycleState::Installed);
        assert_eq!(stores.staging.len().await.unwrap(), 2);
        // Content is untouched until activation
        assert_eq!(stores.content.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn install_uses_cache_bypass_fetches() {
        let (mut worker, fetcher, _stores) = worker_with(MANIFEST, &["main.js"]);
        serve_paths(&fetcher, &[("main.js", b"js")]).await;

        worker.install().await.unwrap();

        let requests = fetcher.requests().await;
        assert_eq!(
            requests,
            vec![("https://app.example.com/main.js".to_string(), FetchMode::Reload)]
        );
    }

    #[tokio::test]
    async fn install_fails_on_network_error() {
        let (mut worker, fetcher, stores) = worker_with(MANIFEST, &["index.html", "main.js"]);
        serve_paths(&fetcher, &[("index.html", b"<html>")]).await;
        fetcher.fail("https://app.example.com/main.js").await;

        let result = worker.install().await;

        assert!(matches!(result, Err(LarderError::InstallFailed(_))));
        assert_eq!(worker.state(), LifecycleState::New);
    }

    #[tokio::test]
    async fn install_fails_on_error_status() {
        let (mut worker, fetcher, _stores) = worker_with(MANIFEST, &["main.js"]);
        fetcher
            .serve_response(
                "https://app.example.com/main.js",
                StoredResponse::new("https://app.example.com/main.js", 500, None, vec![]),
            )
            .await;

        let result = worker.install().await;
        assert!(matches!(result, Err(LarderError::InstallFailed(_))));
    }

    #[tokio::test]
    async fn install_with_empty_core_succeeds() {
        let (mut worker, _fetcher, stores) = worker_with(MANIFEST, &[]);
        let staged = worker.install().await.unwrap();
        assert_eq!(staged, 0);
        assert_eq!(stores.staging.len().await.unwrap(), 0);
    }
}
