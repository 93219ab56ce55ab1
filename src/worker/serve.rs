//! Fetch interception and serving policies
//!
//! Entry-document keys (the root alias and `/`-prefixed routes) are
//! online-first so the user always sees the latest deployed shell when a
//! network is available. Every other manifest asset is cache-first with
//! lazy population. Requests outside the manifest pass through untouched.

use crate::error::LarderResult;
use crate::fetch::{FetchMode, Method, ResourceRequest};
use crate::manifest::{is_entry_key, logical_key};
use crate::worker::Worker;
use tracing::debug;

/// Outcome of fetch interception
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Served {
    /// Not intercepted; the platform handles the request normally
    Passthrough,
    /// Served from the content cache
    Cached(crate::store::StoredResponse),
    /// Served live from the network
    Network(crate::store::StoredResponse),
}

impl Served {
    /// The response, unless the request passed through
    pub fn response(&self) -> Option<&crate::store::StoredResponse> {
        match self {
            Self::Passthrough => None,
            Self::Cached(response) | Self::Network(response) => Some(response),
        }
    }
}

impl Worker {
    /// Intercept one outgoing request.
    ///
    /// Only GET requests for manifest keys are handled; anything else is
    /// a passthrough. Errors are returned only when a policy exhausts
    /// both network and cache.
    pub async fn handle_fetch(&self, request: &ResourceRequest) -> LarderResult<Served> {
        if request.method != Method::Get {
            debug!(method = request.method.as_str(), "non-GET request, passing through");
            return Ok(Served::Passthrough);
        }

        let Some(key) = logical_key(&self.origin, &request.url) else {
            return Ok(Served::Passthrough);
        };

        let Some(canonical) = self.manifest().match_key(&key) else {
            debug!(key, "not a manifest resource, passing through");
            return Ok(Served::Passthrough);
        };

        if is_entry_key(canonical) {
            self.online_first(request).await
        } else {
            self.cache_first(request).await
        }
    }

    /// Network first, cache as the offline fallback. Used for the entry
    /// document and its route aliases only.
    async fn online_first(&self, request: &ResourceRequest) -> LarderResult<Served> {
        match self.fetcher.fetch(request, FetchMode::Default).await {
            Ok(response) => {
                self.stores
                    .content
                    .put(&request.url, response.clone())
                    .await?;
                Ok(Served::Network(response))
            }
            Err(err) => match self.stores.content.get(&request.url).await? {
                Some(cached) => {
                    debug!(url = %request.url, "network failed, serving cached entry document");
                    Ok(Served::Cached(cached))
                }
                None => Err(err),
            },
        }
    }

    /// Cache first, populating lazily on a miss. Only HTTP-ok responses
    /// are cached; error responses go to the caller uncached.
    async fn cache_first(&self, request: &ResourceRequest) -> LarderResult<Served> {
        if let Some(cached) = self.stores.content.get(&request.url).await? {
            return Ok(Served::Cached(cached));
        }

        let response = self.fetcher.fetch(request, FetchMode::Default).await?;
        if response.is_ok() {
            self.stores
                .content
                .put(&request.url, response.clone())
                .await?;
        }
        Ok(Served::Network(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LarderError;
    use crate::store::StoredResponse;
    use crate::worker::testutil::*;

    const MANIFEST: &str =
        r#"{"/": "h0", "index.html": "h0", "main.js": "h1", "/page": "h0", "app.css": "h2"}"#;

    fn url(path: &str) -> String {
        format!("{}/{}", ORIGIN, path.trim_start_matches('/'))
    }

    #[tokio::test]
    async fn non_get_passes_through() {
        let (worker, fetcher, _stores) = worker_with(MANIFEST, &[]);
        let request = ResourceRequest {
            method: Method::Post,
            url: url("main.js"),
        };

        let served = worker.handle_fetch(&request).await.unwrap();

        assert_eq!(served, Served::Passthrough);
        assert!(fetcher.requests().await.is_empty());
    }

    #[tokio::test]
    async fn non_manifest_path_passes_through() {
        let (worker, fetcher, stores) = worker_with(MANIFEST, &[]);
        let request = ResourceRequest::get(url("api/data.json"));

        let served = worker.handle_fetch(&request).await.unwrap();

        assert_eq!(served, Served::Passthrough);
        assert!(fetcher.requests().await.is_empty());
        assert_eq!(stores.content.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn foreign_origin_passes_through() {
        let (worker, fetcher, _stores) = worker_with(MANIFEST, &[]);
        let request = ResourceRequest::get("https://cdn.example.net/main.js");

        let served = worker.handle_fetch(&request).await.unwrap();

        assert_eq!(served, Served::Passthrough);
        assert!(fetcher.requests().await.is_empty());
    }

    #[tokio::test]
    async fn asset_served_from_cache_without_network() {
        let (worker, fetcher, stores) = worker_with(MANIFEST, &[]);
        let u = url("main.js");
        stores
            .content
            .put(&u, StoredResponse::new(&u, 200, None, b"cached".to_vec()))
            .await
            .unwrap();

        let served = worker.handle_fetch(&ResourceRequest::get(&u)).await.unwrap();

        assert_eq!(served.response().unwrap().body, b"cached");
        assert!(matches!(served, Served::Cached(_)));
        assert!(fetcher.requests().await.is_empty());
    }

    #[tokio::test]
    async fn asset_miss_populates_cache_lazily() {
        let (worker, fetcher, stores) = worker_with(MANIFEST, &[]);
        serve_paths(&fetcher, &[("main.js", b"js")]).await;
        let u = url("main.js");

        let served = worker.handle_fetch(&ResourceRequest::get(&u)).await.unwrap();

        assert!(matches!(served, Served::Network(_)));
        let cached = stores.content.get(&u).await.unwrap().unwrap();
        assert_eq!(cached.body, b"js");
    }

    #[tokio::test]
    async fn asset_error_status_is_returned_but_not_cached() {
        let (worker, fetcher, stores) = worker_with(MANIFEST, &[]);
        let u = url("main.js");
        fetcher
            .serve_response(&u, StoredResponse::new(&u, 503, None, vec![]))
            .await;

        let served = worker.handle_fetch(&ResourceRequest::get(&u)).await.unwrap();

        assert_eq!(served.response().unwrap().status, 503);
        assert!(stores.content.get(&u).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn asset_network_failure_without_cache_propagates() {
        let (worker, fetcher, _stores) = worker_with(MANIFEST, &[]);
        let u = url("app.css");
        fetcher.fail(&u).await;

        let result = worker.handle_fetch(&ResourceRequest::get(&u)).await;
        assert!(matches!(result, Err(LarderError::FetchFailed { .. })));
    }

    #[tokio::test]
    async fn entry_document_is_online_first() {
        let (worker, fetcher, stores) = worker_with(MANIFEST, &[]);
        let u = url("/");
        // Both cache and network can serve; network must win
        stores
            .content
            .put(&u, StoredResponse::new(&u, 200, None, b"stale".to_vec()))
            .await
            .unwrap();
        fetcher.serve(&u, b"fresh").await;

        let served = worker.handle_fetch(&ResourceRequest::get(&u)).await.unwrap();

        assert!(matches!(served, Served::Network(_)));
        assert_eq!(served.response().unwrap().body, b"fresh");
        // The live response replaced the cached copy
        let cached = stores.content.get(&u).await.unwrap().unwrap();
        assert_eq!(cached.body, b"fresh");
    }

    #[tokio::test]
    async fn entry_document_falls_back_to_cache_offline() {
        let (worker, fetcher, stores) = worker_with(MANIFEST, &[]);
        let u = url("/");
        stores
            .content
            .put(&u, StoredResponse::new(&u, 200, None, b"cached".to_vec()))
            .await
            .unwrap();
        fetcher.fail(&u).await;

        let served = worker.handle_fetch(&ResourceRequest::get(&u)).await.unwrap();

        assert!(matches!(served, Served::Cached(_)));
        assert_eq!(served.response().unwrap().body, b"cached");
    }

    #[tokio::test]
    async fn entry_document_offline_without_cache_errors() {
        let (worker, fetcher, _stores) = worker_with(MANIFEST, &[]);
        let u = url("/");
        fetcher.fail(&u).await;

        let result = worker.handle_fetch(&ResourceRequest::get(&u)).await;
        assert!(matches!(result, Err(LarderError::FetchFailed { .. })));
    }

    #[tokio::test]
    async fn fragment_request_resolves_to_entry_document() {
        let (worker, fetcher, _stores) = worker_with(MANIFEST, &[]);
        let fragment_url = format!("{ORIGIN}/#settings");
        fetcher.serve(&fragment_url, b"shell").await;

        let served = worker
            .handle_fetch(&ResourceRequest::get(&fragment_url))
            .await
            .unwrap();

        // Resolved to "/" and served online-first
        assert!(matches!(served, Served::Network(_)));
    }

    #[tokio::test]
    async fn versioned_route_is_online_first() {
        // /page?v=3 with manifest key "/page": the cache-buster is
        // stripped and the route alias serves online-first.
        let (worker, fetcher, _stores) = worker_with(MANIFEST, &[]);
        let versioned = format!("{ORIGIN}/page?v=3");
        fetcher.serve(&versioned, b"shell").await;

        let served = worker
            .handle_fetch(&ResourceRequest::get(&versioned))
            .await
            .unwrap();

        assert!(matches!(served, Served::Network(_)));
        let requests = fetcher.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].1, FetchMode::Default);
    }
}
