//! CLI command implementations

pub mod config;
pub mod download;
pub mod get;
pub mod init;
pub mod reset;
pub mod status;
pub mod sync;

pub use config::execute as config;
pub use download::execute as download;
pub use get::execute as get;
pub use init::execute as init;
pub use reset::execute as reset;
pub use status::execute as status;
pub use sync::execute as sync;

use crate::cli::args::OverrideArgs;
use crate::config::schema::StoreBackend;
use crate::config::Config;

/// Apply per-invocation flag overrides on top of the loaded config
pub(crate) fn apply_overrides(mut config: Config, overrides: &OverrideArgs) -> Config {
    if let Some(ref manifest) = overrides.manifest {
        config.worker.manifest_path = Some(manifest.clone());
    }
    if let Some(ref origin) = overrides.origin {
        config.worker.origin = origin.clone();
    }
    if let Some(ref dir) = overrides.store_dir {
        config.store.dir = Some(dir.clone());
    }
    if overrides.memory {
        config.store.backend = StoreBackend::Memory;
    }
    config
}
