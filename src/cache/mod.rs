//! Caches owned by an engine.
//!
//! - [`chain`]: layout name list → resolved [`LayoutChain`]
//! - [`render`]: [`CacheKey`] → rendered bytes
//! - [`key`]: how render cache keys are derived from a request
//!
//! Both caches belong to one [`Engine`](crate::engine::Engine) instance; there
//! is no process-wide state, so independently built engines never share
//! entries. Both are append-only.

pub mod chain;
pub mod key;
pub mod render;

pub use chain::{ChainCache, LayoutChain, chain_key};
pub use key::{BindingRef, BindingShape, CacheKey};
pub use render::{RenderCache, RenderCacheStats};
