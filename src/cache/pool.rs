//! Buffer Pool Module
//!
//! Reusable growable byte buffers handed to write sinks and reclaimed when
//! entries leave the cache.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, PoisonError};

use bytes::BytesMut;

/// Initial capacity of a freshly allocated buffer
pub const DEFAULT_BUFFER_CAPACITY: usize = 4 * 1024;

/// Buffers that grew past this capacity are dropped instead of pooled
pub const DEFAULT_MAX_RETAINED_CAPACITY: usize = 1024 * 1024;

/// Default number of idle buffers kept by [`SharedBufferPool`]
pub const DEFAULT_MAX_POOLED: usize = 64;

// == Buffer Pool ==
/// Source of growable byte buffers.
///
/// The cache only calls `acquire` when a write sink is created and `release`
/// when a buffer is no longer referenced by the cache. `release` may be
/// called while the cache lock is held, so implementations must not call
/// back into the cache.
pub trait BufferPool: Send + Sync {
    /// Hands out an empty buffer.
    fn acquire(&self) -> BytesMut;

    /// Takes a buffer back. The buffer is reset before it is reused.
    fn release(&self, buf: BytesMut);
}

// == Shared Buffer Pool ==
/// Bounded free-list pool of `BytesMut` buffers.
#[derive(Debug)]
pub struct SharedBufferPool {
    free: Mutex<Vec<BytesMut>>,
    max_pooled: usize,
    buffer_capacity: usize,
    max_retained_capacity: usize,
}

impl SharedBufferPool {
    /// Creates a pool keeping at most `max_pooled` idle buffers.
    pub fn new(max_pooled: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(max_pooled)),
            max_pooled,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            max_retained_capacity: DEFAULT_MAX_RETAINED_CAPACITY,
        }
    }

    /// Sets the capacity of newly allocated buffers.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Sets the largest capacity a released buffer may have and still be pooled.
    pub fn with_max_retained_capacity(mut self, capacity: usize) -> Self {
        self.max_retained_capacity = capacity;
        self
    }

    /// Number of idle buffers currently held.
    pub fn pooled(&self) -> usize {
        self.free.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for SharedBufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_POOLED)
    }
}

impl BufferPool for SharedBufferPool {
    fn acquire(&self) -> BytesMut {
        let reused = self
            .free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        reused.unwrap_or_else(|| BytesMut::with_capacity(self.buffer_capacity))
    }

    fn release(&self, mut buf: BytesMut) {
        buf.clear();
        if buf.capacity() > self.max_retained_capacity {
            return;
        }

        let mut free = self.free.lock().unwrap_or_else(PoisonError::into_inner);
        if free.len() < self.max_pooled {
            free.push(buf);
        }
    }
}

// == Pooled Buffer ==
/// A buffer on loan from a pool, returned to it when dropped.
///
/// `into_inner` moves ownership out, after which dropping the guard is a
/// no-op.
pub struct PooledBuffer {
    buf: BytesMut,
    pool: Arc<dyn BufferPool>,
}

impl PooledBuffer {
    pub fn acquire(pool: Arc<dyn BufferPool>) -> Self {
        Self {
            buf: pool.acquire(),
            pool,
        }
    }

    /// Takes the buffer out without returning it to the pool.
    pub fn into_inner(mut self) -> BytesMut {
        std::mem::take(&mut self.buf)
    }
}

impl Deref for PooledBuffer {
    type Target = BytesMut;

    fn deref(&self) -> &BytesMut {
        &self.buf
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        let buf = std::mem::take(&mut self.buf);
        // Zero capacity means the buffer was moved out
        if buf.capacity() > 0 {
            self.pool.release(buf);
        }
    }
}

impl std::fmt::Debug for PooledBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("len", &self.buf.len())
            .field("capacity", &self.buf.capacity())
            .finish()
    }
}
