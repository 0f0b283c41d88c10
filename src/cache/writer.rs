//! Write Sink Module
//!
//! First phase of the two-phase write: bytes are streamed into a private
//! pooled buffer without touching the cache lock, then `commit` publishes
//! or rejects the entry.

use std::io;

use crate::cache::{ObjectCache, PooledBuffer};
use crate::error::{CacheError, Result};

// == Write Sink ==
/// A pending write for a single key, returned by [`ObjectCache::create`].
///
/// The private buffer is a [`PooledBuffer`]: unless a commit stores it, it
/// goes back to the pool when the sink or the commit future is dropped.
pub struct WriteSink {
    cache: ObjectCache,
    key: String,
    buf: PooledBuffer,
    /// Bytes offered to `write`, including any that were refused
    attempted: u64,
}

impl WriteSink {
    pub(crate) fn new(cache: ObjectCache, key: String, buf: PooledBuffer) -> Self {
        Self {
            cache,
            key,
            buf,
            attempted: 0,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Bytes accepted so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Commit ==
    /// Finalizes the write.
    ///
    /// - nothing written: the buffer is released and nothing is stored
    /// - more than the per-entry cap offered: [`CacheError::CacheFull`]
    /// - otherwise the entry is stored, replacing any entry under the same key
    pub async fn commit(self) -> Result<()> {
        let WriteSink {
            cache,
            key,
            buf,
            attempted,
        } = self;
        cache.commit(key, buf, attempted).await
    }
}

impl io::Write for WriteSink {
    /// Appends to the private buffer.
    ///
    /// Fails with [`CacheError::ExcessWrite`] once the total offered would
    /// exceed the per-entry cap; the sink then stays rejected and `commit`
    /// reports `CacheFull`.
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let limit = self.cache.max_entry_size();
        self.attempted = self.attempted.saturating_add(data.len() as u64);
        if self.attempted > limit {
            return Err(CacheError::ExcessWrite {
                key: self.key.clone(),
                limit,
            }
            .into());
        }

        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for WriteSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteSink")
            .field("key", &self.key)
            .field("len", &self.len())
            .field("attempted", &self.attempted)
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use crate::cache::{ObjectCache, SharedBufferPool, NO_EXPIRY};
    use crate::error::CacheError;

    #[tokio::test]
    async fn test_write_accumulates() {
        let cache = ObjectCache::new(1000, NO_EXPIRY).unwrap();
        let mut sink = cache.create("obj");

        sink.write_all(b"hello ").unwrap();
        sink.write_all(b"world").unwrap();
        assert_eq!(sink.len(), 11);
        assert_eq!(sink.key(), "obj");

        sink.commit().await.unwrap();
        assert_eq!(cache.get("obj").await.unwrap().as_bytes(), b"hello world");
    }

    #[tokio::test]
    async fn test_excess_write_rejected_early() {
        // 100 / 10 = 10 byte entry cap
        let cache = ObjectCache::new(100, NO_EXPIRY).unwrap();
        let mut sink = cache.create("obj");

        sink.write_all(b"0123456789").unwrap();
        let err = sink.write(b"x").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);

        // Later small writes stay rejected
        assert!(sink.write(b"").is_err());
        assert_eq!(sink.len(), 10);

        let result = sink.commit().await;
        assert!(matches!(
            result,
            Err(CacheError::CacheFull { size: 11, limit: 10, .. })
        ));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_dropped_sink_releases_buffer() {
        let pool = Arc::new(SharedBufferPool::new(8));
        let cache = ObjectCache::with_pool(1000, NO_EXPIRY, pool.clone()).unwrap();

        {
            let mut sink = cache.create("abandoned");
            sink.write_all(b"never committed").unwrap();
        }

        assert_eq!(pool.pooled(), 1);
        assert!(cache.get("abandoned").await.is_err());
    }
}
