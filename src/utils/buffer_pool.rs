//! Pool of reusable render buffers.
//!
//! Every render borrows buffers for the base template and for each layout step.
//! [`BufferPool::acquire`] hands out a [`PooledBuffer`] guard; dropping the guard
//! clears the buffer and returns it to the pool, on success and error paths
//! alike. The pool keeps at most `max_retained` idle buffers and drops buffers
//! that grew beyond `max_buffer_capacity`, which bounds the memory held between
//! renders.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

use crate::config::PoolConfig;
use crate::constants::INITIAL_BUFFER_CAPACITY;

/// Bounded pool of byte buffers.
#[derive(Debug)]
pub struct BufferPool {
    idle: Mutex<Vec<Vec<u8>>>,
    max_retained: usize,
    max_buffer_capacity: usize,
}

impl BufferPool {
    /// Create a pool with the given limits.
    #[must_use]
    pub fn new(config: PoolConfig) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            max_retained: config.max_retained,
            max_buffer_capacity: config.max_buffer_capacity,
        }
    }

    /// Borrow an empty buffer.
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let buffer = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(INITIAL_BUFFER_CAPACITY));

        PooledBuffer {
            buffer,
            pool: self,
        }
    }

    /// Number of idle buffers.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn release(&self, mut buffer: Vec<u8>) {
        if buffer.capacity() > self.max_buffer_capacity {
            return;
        }
        buffer.clear();

        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < self.max_retained {
            idle.push(buffer);
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

/// A buffer borrowed from a [`BufferPool`]; returned when dropped.
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    buffer: Vec<u8>,
    pool: &'a BufferPool,
}

impl Deref for PooledBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buffer
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buffer));
    }
}
