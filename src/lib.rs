//! objcache - A size-bounded in-memory object cache
//!
//! Callers stream bytes into a [`cache::WriteSink`], commit them under a key,
//! and read them back as [`cache::Snapshot`]s. With a non-zero expiry, a
//! background janitor evicts entries left idle longer than the expiry.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{ObjectCache, Snapshot, WriteSink, DEFAULT_EXPIRY, NO_EXPIRY};
pub use config::Config;
pub use error::{CacheError, Result};
