//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with sliding expiry.

use std::time::Duration;

use bytes::BytesMut;
use chrono::{DateTime, Utc};

// == Cache Entry ==
/// A committed payload and the last time it was written or read.
#[derive(Debug)]
pub struct CacheEntry {
    /// The stored bytes, owned by the cache
    buf: BytesMut,
    /// Commit time, refreshed on every successful read
    last_accessed: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry committed at `now`.
    pub fn new(buf: BytesMut, now: DateTime<Utc>) -> Self {
        Self {
            buf,
            last_accessed: now,
        }
    }

    /// Stored bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Byte length of the payload.
    pub fn len(&self) -> u64 {
        self.buf.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn last_accessed(&self) -> DateTime<Utc> {
        self.last_accessed
    }

    // == Touch ==
    /// Records an access at `now`.
    ///
    /// The timestamp never moves backwards, even if the wall clock does.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_accessed {
            self.last_accessed = now;
        }
    }

    // == Is Stale ==
    /// True when the caller knows of a write newer than this entry.
    pub fn is_stale(&self, reference: DateTime<Utc>) -> bool {
        self.last_accessed < reference
    }

    // == Is Idle ==
    /// True when the entry has gone untouched for strictly longer than `expiry`.
    ///
    /// A zero expiry disables idle expiry.
    pub fn is_idle(&self, expiry: Duration, now: DateTime<Utc>) -> bool {
        if expiry.is_zero() {
            return false;
        }
        match (now - self.last_accessed).to_std() {
            Ok(idle) => idle > expiry,
            // last_accessed is ahead of `now`
            Err(_) => false,
        }
    }

    /// Gives the buffer back, consuming the entry.
    pub fn into_buffer(self) -> BytesMut {
        self.buf
    }
}
