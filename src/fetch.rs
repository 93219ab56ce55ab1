//! Resource fetching abstraction
//!
//! The worker never talks to the network directly; it goes through the
//! [`Fetcher`] trait so the HTTP client can be swapped for a fixture in
//! tests and dry runs.

use crate::error::{LarderError, LarderResult};
use crate::store::StoredResponse;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;
use tracing::debug;

/// HTTP request method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Options,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
        }
    }
}

/// A request as seen by the worker's fetch interception
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub method: Method,
    pub url: String,
}

impl ResourceRequest {
    /// Shorthand for a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
        }
    }
}

/// Cache semantics of an outgoing fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Normal request, intermediaries may serve from their HTTP caches
    Default,
    /// Force a network round trip, bypassing any HTTP cache
    Reload,
}

/// Abstract resource fetcher
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a resource. A returned response may carry any HTTP status;
    /// an `Err` means the request did not complete at all.
    async fn fetch(
        &self,
        request: &ResourceRequest,
        mode: FetchMode,
    ) -> LarderResult<StoredResponse>;
}

/// Fetcher backed by a reqwest client
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> LarderResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| LarderError::Internal(format!("building HTTP client: {e}")))?;
        Ok(Self { client })
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Options => reqwest::Method::OPTIONS,
            Method::Patch => reqwest::Method::PATCH,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(
        &self,
        request: &ResourceRequest,
        mode: FetchMode,
    ) -> LarderResult<StoredResponse> {
        let mut builder = self
            .client
            .request(Self::method(request.method), &request.url);

        if mode == FetchMode::Reload {
            builder = builder
                .header("Cache-Control", "no-cache")
                .header("Pragma", "no-cache");
        }

        let response = builder
            .send()
            .await
            .map_err(|e| LarderError::fetch(&request.url, e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body = response
            .bytes()
            .await
            .map_err(|e| LarderError::fetch(&request.url, format!("reading body: {e}")))?;

        debug!(url = %request.url, status, ?mode, "fetched resource");
        Ok(StoredResponse::new(
            &request.url,
            status,
            content_type,
            body.to_vec(),
        ))
    }
}

/// Fixture-backed fetcher for tests and offline dry runs.
///
/// Serves canned responses by URL, records every request it sees, and
/// fails requests listed in the failure set the way a dead network would.
#[derive(Default)]
pub struct FixtureFetcher {
    responses: Mutex<HashMap<String, StoredResponse>>,
    failures: Mutex<HashSet<String>>,
    log: Mutex<Vec<(String, FetchMode)>>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a 200 response with the given body for `url`
    pub async fn serve(&self, url: &str, body: &[u8]) {
        let mut responses = self.responses.lock().await;
        responses.insert(
            url.to_string(),
            StoredResponse::new(url, 200, None, body.to_vec()),
        );
    }

    /// Register an arbitrary canned response for `url`
    pub async fn serve_response(&self, url: &str, response: StoredResponse) {
        let mut responses = self.responses.lock().await;
        responses.insert(url.to_string(), response);
    }

    /// Make requests for `url` fail as network errors
    pub async fn fail(&self, url: &str) {
        let mut failures = self.failures.lock().await;
        failures.insert(url.to_string());
    }

    /// Every request seen so far, in order
    pub async fn requests(&self) -> Vec<(String, FetchMode)> {
        self.log.lock().await.clone()
    }
}

#[async_trait]
impl Fetcher for FixtureFetcher {
    async fn fetch(
        &self,
        request: &ResourceRequest,
        mode: FetchMode,
    ) -> LarderResult<StoredResponse> {
        self.log.lock().await.push((request.url.clone(), mode));

        if self.failures.lock().await.contains(&request.url) {
            return Err(LarderError::fetch(&request.url, "simulated network failure"));
        }

        let responses = self.responses.lock().await;
        match responses.get(&request.url) {
            Some(response) => Ok(response.clone()),
            None => Err(LarderError::fetch(&request.url, "no fixture registered")),
        }
    }
}
