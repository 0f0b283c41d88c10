//! Read snapshots returned by [`ObjectCache::open`](crate::cache::ObjectCache::open).

use std::io::Cursor;
use std::ops::Deref;

use bytes::Bytes;

/// An immutable copy of an entry's bytes taken at read time.
///
/// The snapshot does not alias the cache's buffer, so it stays valid after
/// the entry is deleted, expired, or overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(Bytes);

impl Snapshot {
    pub(crate) fn new(bytes: Bytes) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a reader over the snapshot.
    pub fn reader(&self) -> Cursor<Bytes> {
        Cursor::new(self.0.clone())
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl Deref for Snapshot {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Snapshot {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
