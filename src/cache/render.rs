//! Rendered output cache.
//!
//! Stores the final bytes of successful renders under a [`CacheKey`]. The map is
//! sharded (DashMap), so concurrent renders of unrelated keys do not contend on
//! one lock. Entries are never expired or invalidated: the cache is only correct
//! for template sets that do not change for the lifetime of the engine.

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::key::CacheKey;

/// Counters describing cache usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderCacheStats {
    /// Probes that found an entry
    pub hits: u64,
    /// Probes that found nothing
    pub misses: u64,
    /// Stored entries
    pub entries: usize,
}

impl RenderCacheStats {
    /// Hit rate as a percentage of all probes.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Concurrent map from cache key to rendered bytes.
#[derive(Debug, Default)]
pub struct RenderCache {
    entries: DashMap<CacheKey, Arc<[u8]>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RenderCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch rendered bytes, counting the probe as hit or miss.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Arc<[u8]>> {
        match self.entries.get(key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(entry.value()))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store rendered bytes, replacing an existing entry for the same key.
    pub fn put(&self, key: CacheKey, content: Arc<[u8]>) {
        self.entries.insert(key, content);
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Usage counters.
    #[must_use]
    pub fn stats(&self) -> RenderCacheStats {
        RenderCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}
