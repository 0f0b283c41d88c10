//! Cache Module
//!
//! In-memory object cache with a two-phase write protocol, sliding expiry,
//! and eviction notifications.

use std::time::Duration;

mod entry;
mod object_cache;
mod pool;
mod snapshot;
mod stats;
mod store;
mod writer;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub(crate) use object_cache::WeakObjectCache;
pub use object_cache::{max_entry_size_for, EvictionCallback, ObjectCache};
pub use pool::{BufferPool, PooledBuffer, SharedBufferPool, DEFAULT_MAX_POOLED};
pub use snapshot::Snapshot;
pub use stats::CacheStats;
pub use store::{EntryStore, Lookup};
pub use writer::WriteSink;

// == Public Constants ==
/// Entries never expire and must be deleted explicitly.
pub const NO_EXPIRY: Duration = Duration::ZERO;

/// One hour idle window.
pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(60 * 60);

/// The per-entry cap is the total budget divided by this ratio.
pub const DEFAULT_BUFFER_RATIO: u64 = 10;
