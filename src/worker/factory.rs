//! Worker factory: wire a worker from configuration
//!
//! Loads the manifest snapshot, opens the configured store backend and
//! builds the HTTP fetcher. CLI commands go through here so every one of
//! them sees the same wiring.

use crate::config::schema::StoreBackend;
use crate::config::{Config, ConfigManager};
use crate::error::{LarderError, LarderResult};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::manifest::{CoreSet, Manifest};
use crate::store::StoreSet;
use crate::worker::Worker;
use std::sync::Arc;
use tracing::debug;

/// Open the configured store backend
pub async fn open_stores(config: &Config) -> LarderResult<StoreSet> {
    match config.store.backend {
        StoreBackend::Memory => {
            debug!("using in-memory stores");
            Ok(StoreSet::in_memory())
        }
        StoreBackend::Fs => {
            let dir = config
                .store
                .dir
                .clone()
                .unwrap_or_else(ConfigManager::store_dir);
            debug!("using filesystem stores at {}", dir.display());
            StoreSet::on_disk(&dir).await
        }
    }
}

/// Build a worker over the configured manifest, stores and fetcher
pub async fn build_worker(config: &Config) -> LarderResult<Worker> {
    let path = config
        .worker
        .manifest_path
        .as_ref()
        .ok_or(LarderError::ManifestUnset)?;
    let manifest = Manifest::from_file(path).await?;
    let core = CoreSet::new(config.worker.core.clone(), &manifest)?;

    let stores = open_stores(config).await?;
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new()?);

    Worker::new(manifest, core, &config.worker.origin, fetcher, stores)
}
