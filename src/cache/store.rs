//! Entry Store Module
//!
//! Keyed entry storage with byte accounting. Every method expects the caller
//! to hold the cache lock; the store itself is plain data.

use std::collections::HashMap;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};

use crate::cache::{CacheEntry, CacheStats};

// == Lookup ==
/// Outcome of reading a key.
#[derive(Debug)]
pub enum Lookup {
    /// A copy of the stored bytes
    Hit(Bytes),
    /// No entry under the key
    Missing,
    /// The entry was older than the reference time and has been removed;
    /// carries its buffer so the caller can return it to the pool
    Stale(BytesMut),
}

// == Entry Store ==
/// Mapping from key to committed entry.
#[derive(Debug, Default)]
pub struct EntryStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Hit, miss and eviction counters
    stats: CacheStats,
    /// Sum of the byte lengths of all stored entries
    current_size: u64,
}

impl EntryStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Insert ==
    /// Stores `buf` under `key` with `now` as its access time.
    ///
    /// Returns the buffer of the entry it replaced, if any. Replacement is
    /// not counted as an eviction.
    pub fn insert(&mut self, key: String, buf: BytesMut, now: DateTime<Utc>) -> Option<BytesMut> {
        let entry = CacheEntry::new(buf, now);
        self.current_size += entry.len();

        let replaced = self.entries.insert(key, entry)?;
        self.current_size -= replaced.len();
        Some(replaced.into_buffer())
    }

    // == Open ==
    /// Reads `key`, refreshing its access time on a hit.
    ///
    /// With a `reference` time, an entry last accessed strictly before it is
    /// removed and reported as stale.
    pub fn open(
        &mut self,
        key: &str,
        reference: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Lookup {
        let Some(entry) = self.entries.get_mut(key) else {
            self.stats.record_miss();
            return Lookup::Missing;
        };

        if reference.is_some_and(|reference| entry.is_stale(reference)) {
            self.stats.record_miss();
            return match self.remove(key) {
                Some(buf) => Lookup::Stale(buf),
                None => Lookup::Missing,
            };
        }

        entry.touch(now);
        self.stats.record_hit();
        Lookup::Hit(Bytes::copy_from_slice(entry.bytes()))
    }

    // == Remove ==
    /// Removes `key`, returning its buffer when it was present.
    pub fn remove(&mut self, key: &str) -> Option<BytesMut> {
        let entry = self.entries.remove(key)?;
        self.current_size -= entry.len();
        self.stats.record_eviction();
        Some(entry.into_buffer())
    }

    // == Remove Idle ==
    /// Removes every entry idle for longer than `expiry`.
    ///
    /// Returns the evicted keys with their buffers.
    pub fn remove_idle(&mut self, expiry: Duration, now: DateTime<Utc>) -> Vec<(String, BytesMut)> {
        let idle_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_idle(expiry, now))
            .map(|(key, _)| key.clone())
            .collect();

        idle_keys
            .into_iter()
            .filter_map(|key| self.remove(&key).map(|buf| (key, buf)))
            .collect()
    }

    // == Accessors ==
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    /// Returns counters plus current entry count and byte total.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.total_entries = self.entries.len();
        stats.current_size = self.current_size;
        stats
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn buf(data: &[u8]) -> BytesMut {
        BytesMut::from(data)
    }

    #[test]
    fn test_store_new() {
        let store = EntryStore::new();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.current_size(), 0);
    }

    #[test]
    fn test_store_insert_and_open() {
        let mut store = EntryStore::new();
        let now = Utc::now();

        assert!(store.insert("key1".to_string(), buf(b"value1"), now).is_none());

        match store.open("key1", None, now) {
            Lookup::Hit(bytes) => assert_eq!(&bytes[..], b"value1"),
            other => panic!("expected hit, got {:?}", other),
        }
        assert_eq!(store.len(), 1);
        assert_eq!(store.current_size(), 6);
    }

    #[test]
    fn test_store_open_missing() {
        let mut store = EntryStore::new();

        assert!(matches!(
            store.open("nonexistent", None, Utc::now()),
            Lookup::Missing
        ));
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_overwrite_adjusts_size() {
        let mut store = EntryStore::new();
        let now = Utc::now();

        store.insert("key1".to_string(), buf(b"value1"), now);
        let replaced = store.insert("key1".to_string(), buf(b"v2"), now);

        assert_eq!(replaced.as_deref(), Some(&b"value1"[..]));
        assert_eq!(store.len(), 1);
        assert_eq!(store.current_size(), 2);
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_store_remove() {
        let mut store = EntryStore::new();
        store.insert("key1".to_string(), buf(b"value1"), Utc::now());

        assert_eq!(store.remove("key1").as_deref(), Some(&b"value1"[..]));
        assert!(store.is_empty());
        assert_eq!(store.current_size(), 0);
        assert_eq!(store.stats().evictions, 1);

        assert!(store.remove("key1").is_none());
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_stale_reference_removes_entry() {
        let mut store = EntryStore::new();
        let committed = Utc::now();
        store.insert("key1".to_string(), buf(b"value1"), committed);

        let reference = committed + ChronoDuration::seconds(1);
        assert!(matches!(
            store.open("key1", Some(reference), committed),
            Lookup::Stale(_)
        ));
        assert!(!store.contains("key1"));
        assert_eq!(store.current_size(), 0);

        // Next read is a plain miss
        assert!(matches!(
            store.open("key1", None, committed),
            Lookup::Missing
        ));
    }

    #[test]
    fn test_store_open_refreshes_access_time() {
        let mut store = EntryStore::new();
        let committed = Utc::now();
        store.insert("key1".to_string(), buf(b"value1"), committed);

        let read_at = committed + ChronoDuration::seconds(30);
        assert!(matches!(store.open("key1", None, read_at), Lookup::Hit(_)));

        // A reference older than the read is fresh
        let reference = committed + ChronoDuration::seconds(10);
        assert!(matches!(
            store.open("key1", Some(reference), read_at),
            Lookup::Hit(_)
        ));
    }

    #[test]
    fn test_store_remove_idle() {
        let mut store = EntryStore::new();
        let start = Utc::now();
        let expiry = Duration::from_secs(10);

        store.insert("old".to_string(), buf(b"aaaa"), start);
        store.insert("fresh".to_string(), buf(b"bb"), start + ChronoDuration::seconds(8));

        let evicted = store.remove_idle(expiry, start + ChronoDuration::seconds(11));
        let keys: Vec<&str> = evicted.iter().map(|(k, _)| k.as_str()).collect();

        assert_eq!(keys, vec!["old"]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.current_size(), 2);
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_stats() {
        let mut store = EntryStore::new();
        let now = Utc::now();

        store.insert("key1".to_string(), buf(b"value1"), now);
        let _ = store.open("key1", None, now); // hit
        let _ = store.open("nonexistent", None, now); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.current_size, 6);
    }
}
