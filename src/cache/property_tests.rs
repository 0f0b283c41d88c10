//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the write protocol and byte accounting against
//! arbitrary payloads and operation sequences.

use proptest::prelude::*;
use std::collections::HashMap;
use std::io::Write;

use chrono::Utc;
use tokio_test::block_on;

use crate::cache::{ObjectCache, NO_EXPIRY};
use crate::error::{CacheError, Result};

// == Test Configuration ==
/// Gives a 256 byte per-entry cap
const TEST_MAX_SIZE: u64 = 2560;
const TEST_MAX_ENTRY_SIZE: usize = 256;

// == Strategies ==
/// Generates valid cache keys
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_/]{1,32}".prop_map(|s| s)
}

/// Generates payloads that fit under the per-entry cap
fn valid_payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=TEST_MAX_ENTRY_SIZE)
}

/// Generates payloads over the per-entry cap
fn oversized_payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), TEST_MAX_ENTRY_SIZE + 1..TEST_MAX_ENTRY_SIZE * 3)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: String, payload: Vec<u8> },
    Get { key: String },
    Delete { key: String },
}

/// Draws from a small key space so operations collide
fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    let key = "k[0-7]";
    prop_oneof![
        (key, prop::collection::vec(any::<u8>(), 0..=TEST_MAX_ENTRY_SIZE))
            .prop_map(|(key, payload)| CacheOp::Put { key, payload }),
        key.prop_map(|key| CacheOp::Get { key }),
        key.prop_map(|key| CacheOp::Delete { key }),
    ]
}

fn test_cache() -> ObjectCache {
    ObjectCache::new(TEST_MAX_SIZE, NO_EXPIRY).unwrap()
}

async fn put(cache: &ObjectCache, key: &str, payload: &[u8]) -> Result<()> {
    let mut sink = cache.create(key);
    // Oversized payloads are refused mid-stream; commit reports the outcome
    let _ = sink.write_all(payload);
    sink.commit().await
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Round trip: a committed payload reads back byte for byte, including
    // with a reference time no later than the commit
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), payload in valid_payload_strategy()) {
        let cache = test_cache();
        let before_commit = Utc::now();

        block_on(put(&cache, &key, &payload)).unwrap();

        let snapshot = block_on(cache.open(&key, before_commit)).unwrap();
        prop_assert_eq!(snapshot.as_bytes(), &payload[..]);
    }

    // Overwrite: the last commit under a key wins and sizes are not double counted
    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        first in valid_payload_strategy(),
        second in valid_payload_strategy()
    ) {
        let cache = test_cache();

        block_on(put(&cache, &key, &first)).unwrap();
        block_on(put(&cache, &key, &second)).unwrap();

        let snapshot = block_on(cache.get(&key)).unwrap();
        prop_assert_eq!(snapshot.as_bytes(), &second[..]);
        prop_assert_eq!(block_on(cache.len()), 1);
        prop_assert_eq!(block_on(cache.current_size()), second.len() as u64);
    }

    // Cap rejection: oversized commits fail with CacheFull and change nothing
    #[test]
    fn prop_cache_full_rejection(
        key in valid_key_strategy(),
        resident in valid_payload_strategy(),
        oversized in oversized_payload_strategy()
    ) {
        let cache = test_cache();
        block_on(put(&cache, "resident", &resident)).unwrap();
        let size_before = block_on(cache.current_size());

        let result = block_on(put(&cache, &key, &oversized));
        let is_cache_full = matches!(result, Err(CacheError::CacheFull { .. }));
        prop_assert!(is_cache_full);
        prop_assert_eq!(block_on(cache.current_size()), size_before);
        if key != "resident" {
            prop_assert!(block_on(cache.get(&key)).is_err());
        }
    }

    // Size accounting: current_size always equals the sum of stored lengths,
    // and a zero-byte put never creates an entry
    #[test]
    fn prop_size_accounting(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let cache = test_cache();
        let mut model: HashMap<String, Vec<u8>> = HashMap::new();
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Put { key, payload } => {
                    block_on(put(&cache, &key, &payload)).unwrap();
                    if !payload.is_empty() {
                        model.insert(key, payload);
                    }
                }
                CacheOp::Get { key } => {
                    match block_on(cache.get(&key)) {
                        Ok(snapshot) => {
                            expected_hits += 1;
                            prop_assert_eq!(Some(snapshot.as_bytes()), model.get(&key).map(|v| &v[..]));
                        }
                        Err(_) => {
                            expected_misses += 1;
                            prop_assert!(!model.contains_key(&key));
                        }
                    }
                }
                CacheOp::Delete { key } => {
                    let removed = block_on(cache.delete(&key));
                    prop_assert_eq!(removed, model.remove(&key).is_some());
                }
            }

            let expected_size: u64 = model.values().map(|v| v.len() as u64).sum();
            prop_assert_eq!(block_on(cache.current_size()), expected_size);
        }

        let stats = block_on(cache.stats());
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_entries, model.len(), "Total entries mismatch");
    }
}
