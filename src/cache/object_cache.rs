//! Object Cache Module
//!
//! The cache handle: entry store behind one lock, the commit half of the
//! write protocol, the read path with freshness checks, explicit deletes,
//! and the janitor lifecycle.

use std::sync::{Arc, Mutex as StdMutex, PoisonError, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::{
    BufferPool, CacheStats, EntryStore, Lookup, PooledBuffer, SharedBufferPool, Snapshot,
    WriteSink, DEFAULT_BUFFER_RATIO,
};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tasks::Janitor;

/// Hook invoked with the key of every explicit delete and janitor eviction,
/// outside the cache lock.
pub type EvictionCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// State guarded by the cache lock.
struct CacheState {
    store: EntryStore,
    on_eviction: Option<EvictionCallback>,
}

struct CacheInner {
    state: Mutex<CacheState>,
    pool: Arc<dyn BufferPool>,
    max_size: u64,
    max_entry_size: u64,
    expiry: Duration,
    janitor: StdMutex<Option<Janitor>>,
}

// == Object Cache ==
/// Size-bounded in-memory object cache.
///
/// Cloning is cheap and every clone refers to the same cache.
///
/// `max_size` only determines the per-entry cap (`max_size / 10`, or
/// `max_size` itself when that rounds to zero). The aggregate of stored
/// bytes is tracked in [`CacheStats::current_size`] but not bounded by it.
#[derive(Clone)]
pub struct ObjectCache {
    inner: Arc<CacheInner>,
}

/// Non-owning reference used by the janitor.
#[derive(Clone)]
pub(crate) struct WeakObjectCache(Weak<CacheInner>);

impl WeakObjectCache {
    pub(crate) fn upgrade(&self) -> Option<ObjectCache> {
        self.0.upgrade().map(|inner| ObjectCache { inner })
    }
}

/// Per-entry cap derived from the total budget.
pub fn max_entry_size_for(max_size: u64) -> u64 {
    match max_size / DEFAULT_BUFFER_RATIO {
        0 => max_size,
        size => size,
    }
}

impl ObjectCache {
    // == Constructors ==
    /// Creates a cache backed by a default [`SharedBufferPool`].
    ///
    /// A non-zero `expiry` starts the janitor, which requires a tokio runtime.
    pub fn new(max_size: u64, expiry: Duration) -> Result<Self> {
        Self::with_pool(max_size, expiry, Arc::new(SharedBufferPool::default()))
    }

    /// Creates a cache that takes its buffers from `pool`.
    pub fn with_pool(max_size: u64, expiry: Duration, pool: Arc<dyn BufferPool>) -> Result<Self> {
        if max_size == 0 {
            return Err(CacheError::InvalidConfig(
                "invalid maximum cache size".to_string(),
            ));
        }

        let cache = Self {
            inner: Arc::new(CacheInner {
                state: Mutex::new(CacheState {
                    store: EntryStore::new(),
                    on_eviction: None,
                }),
                pool,
                max_size,
                max_entry_size: max_entry_size_for(max_size),
                expiry,
                janitor: StdMutex::new(None),
            }),
        };

        if !expiry.is_zero() {
            cache.start_janitor()?;
        }

        Ok(cache)
    }

    /// Creates a cache from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let pool = SharedBufferPool::new(config.pool_buffers);
        Self::with_pool(config.max_size, config.expiry(), Arc::new(pool))
    }

    // == Create ==
    /// Starts a write for `key`.
    ///
    /// No lock is taken until the returned sink is committed.
    pub fn create(&self, key: impl Into<String>) -> WriteSink {
        let buf = PooledBuffer::acquire(self.inner.pool.clone());
        WriteSink::new(self.clone(), key.into(), buf)
    }

    /// Second phase of the write protocol, called by [`WriteSink::commit`].
    ///
    /// `buf` goes back to the pool when dropped, so every early return and a
    /// cancelled wait for the lock both release it.
    pub(crate) async fn commit(
        &self,
        key: String,
        buf: PooledBuffer,
        attempted: u64,
    ) -> Result<()> {
        let limit = self.inner.max_entry_size;

        if attempted > limit {
            warn!(key = %key, size = attempted, limit, "Rejected entry over size limit");
            return Err(CacheError::CacheFull {
                key,
                size: attempted,
                limit,
            });
        }

        if buf.is_empty() {
            debug!(key = %key, "Empty write, nothing stored");
            return Ok(());
        }

        let size = buf.len();
        let mut state = self.inner.state.lock().await;
        if let Some(replaced) = state.store.insert(key.clone(), buf.into_inner(), Utc::now()) {
            self.inner.pool.release(replaced);
        }
        debug!(key = %key, size, "Committed entry");

        Ok(())
    }

    // == Open ==
    /// Reads `key`, treating an entry last accessed before `reference` as stale.
    ///
    /// A stale entry is removed and reported as [`CacheError::NotFound`]. A
    /// hit refreshes the entry's access time.
    pub async fn open(&self, key: &str, reference: DateTime<Utc>) -> Result<Snapshot> {
        self.read(key, Some(reference)).await
    }

    /// Reads `key` without a freshness check.
    pub async fn get(&self, key: &str) -> Result<Snapshot> {
        self.read(key, None).await
    }

    async fn read(&self, key: &str, reference: Option<DateTime<Utc>>) -> Result<Snapshot> {
        let mut state = self.inner.state.lock().await;
        match state.store.open(key, reference, Utc::now()) {
            Lookup::Hit(bytes) => Ok(Snapshot::new(bytes)),
            Lookup::Missing => {
                debug!(key, "Cache miss");
                Err(CacheError::NotFound(key.to_string()))
            }
            // Counted as an eviction, but not reported to the eviction callback
            Lookup::Stale(buf) => {
                self.inner.pool.release(buf);
                debug!(key, "Invalidated stale entry");
                Err(CacheError::NotFound(key.to_string()))
            }
        }
    }

    // == Delete ==
    /// Removes `key`, returning whether an entry was present.
    ///
    /// The eviction callback fires whether or not the key was present, after
    /// the lock is released. Its argument only names the key: another writer
    /// may already have stored a new entry under it.
    pub async fn delete(&self, key: &str) -> bool {
        let (removed, callback) = {
            let mut state = self.inner.state.lock().await;
            let removed = match state.store.remove(key) {
                Some(buf) => {
                    self.inner.pool.release(buf);
                    true
                }
                None => false,
            };
            (removed, state.on_eviction.clone())
        };

        debug!(key, removed, "Delete requested");
        if let Some(callback) = callback {
            callback(key);
        }
        removed
    }

    // == Sweep Expired ==
    /// Evicts every entry idle for longer than the expiry.
    ///
    /// Returns the evicted keys in callback order. With expiry disabled
    /// this is a no-op.
    pub async fn sweep_expired(&self) -> Vec<String> {
        if self.inner.expiry.is_zero() {
            return Vec::new();
        }

        let (evicted, callback) = {
            let mut state = self.inner.state.lock().await;
            let evicted: Vec<String> = state
                .store
                .remove_idle(self.inner.expiry, Utc::now())
                .into_iter()
                .map(|(key, buf)| {
                    self.inner.pool.release(buf);
                    key
                })
                .collect();
            (evicted, state.on_eviction.clone())
        };

        if let Some(callback) = callback {
            for key in &evicted {
                callback(key);
            }
        }
        evicted
    }

    // == Eviction Callback ==
    /// Registers the eviction hook, replacing any previous one.
    pub async fn set_on_eviction<F>(&self, callback: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.inner.state.lock().await.on_eviction = Some(Arc::new(callback));
    }

    pub async fn clear_on_eviction(&self) {
        self.inner.state.lock().await.on_eviction = None;
    }

    // == Janitor ==
    /// Starts the expiry janitor.
    ///
    /// Returns `Ok(false)` when expiry is disabled or a janitor is already
    /// running, and [`CacheError::Runtime`] outside a tokio runtime.
    pub fn start_janitor(&self) -> Result<bool> {
        if self.inner.expiry.is_zero() {
            debug!("Expiry disabled, janitor not started");
            return Ok(false);
        }

        let mut slot = self
            .inner
            .janitor
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|janitor| !janitor.is_finished()) {
            return Ok(false);
        }

        let runtime = Handle::try_current().map_err(|e| CacheError::Runtime(e.to_string()))?;
        *slot = Some(Janitor::spawn(&runtime, self.downgrade(), self.inner.expiry));
        Ok(true)
    }

    /// Stops the expiry janitor and waits for it to exit.
    ///
    /// Returns `false` without blocking when no janitor is running, so
    /// repeated calls are safe.
    pub async fn stop_janitor(&self) -> bool {
        let janitor = self
            .inner
            .janitor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match janitor {
            Some(janitor) => {
                janitor.stop().await;
                info!("Expiry janitor joined");
                true
            }
            None => {
                debug!("No janitor running");
                false
            }
        }
    }

    pub fn janitor_running(&self) -> bool {
        self.inner
            .janitor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|janitor| !janitor.is_finished())
    }

    fn downgrade(&self) -> WeakObjectCache {
        WeakObjectCache(Arc::downgrade(&self.inner))
    }

    // == Accessors ==
    pub fn max_size(&self) -> u64 {
        self.inner.max_size
    }

    pub fn max_entry_size(&self) -> u64 {
        self.inner.max_entry_size
    }

    /// Idle window after which entries expire; zero means never.
    pub fn expiry(&self) -> Duration {
        self.inner.expiry
    }

    pub async fn len(&self) -> usize {
        self.inner.state.lock().await.store.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.state.lock().await.store.is_empty()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.inner.state.lock().await.store.contains(key)
    }

    /// Sum of the byte lengths of all stored entries.
    pub async fn current_size(&self) -> u64 {
        self.inner.state.lock().await.store.current_size()
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        let mut stats = self.inner.state.lock().await.store.stats();
        stats.max_size = self.inner.max_size;
        stats.max_entry_size = self.inner.max_entry_size;
        stats
    }
}

impl std::fmt::Debug for ObjectCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectCache")
            .field("max_size", &self.inner.max_size)
            .field("max_entry_size", &self.inner.max_entry_size)
            .field("expiry", &self.inner.expiry)
            .finish_non_exhaustive()
    }
}
