//! Supporting utilities.
//!
//! - [`buffer_pool`] - Reusable render buffers returned on every exit path

pub mod buffer_pool;

pub use buffer_pool::{BufferPool, PooledBuffer};
