//! Larder - Offline-first asset cache worker
//!
//! Mirrors a compiled web-application bundle into local caches and
//! serves it offline-first, with selective invalidation across builds.

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod store;
pub mod ui;
pub mod worker;

pub use error::{LarderError, LarderResult};
