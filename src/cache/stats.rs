//! Cache Statistics Module
//!
//! Tracks read outcomes, evictions, and byte accounting.

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time cache metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of successful reads
    pub hits: u64,
    /// Number of reads that returned not-found (absent or stale)
    pub misses: u64,
    /// Number of entries removed by delete, staleness, or expiry
    pub evictions: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Sum of the byte lengths of all stored entries
    pub current_size: u64,
    /// Configured total budget (informational)
    pub max_size: u64,
    /// Per-entry byte cap
    pub max_entry_size: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Counts a read that returned a snapshot.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Counts a read of an absent or stale key.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    /// Counts an entry leaving the cache other than by overwrite.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}
