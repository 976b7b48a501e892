//! Layout chain resolution and caching.
//!
//! A [`LayoutChain`] is the resolved form of a layout name list: one compiled
//! template per name, in call order. The first layout wraps the content
//! template, every following layout wraps the previous layout's output.
//!
//! Chains are cached by their length-prefixed names. The set of layout lists a
//! binary uses comes from its own code paths rather than from user input, so
//! the cache only grows and is never evicted.

use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

use crate::cache::key::push_part;
use crate::core::LayoutNotFound;
use crate::registry::TemplateRegistry;
use crate::templating::CompiledTemplate;

/// Resolved layouts in wrap order.
#[derive(Clone, Default)]
pub struct LayoutChain {
    templates: Vec<Arc<dyn CompiledTemplate>>,
}

impl LayoutChain {
    /// Iterate over the layouts in wrap order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn CompiledTemplate>> {
        self.templates.iter()
    }

    /// Number of layouts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the chain wraps nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Layout names in wrap order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.templates.iter().map(|template| template.name()).collect()
    }
}

impl fmt::Debug for LayoutChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutChain").field("layouts", &self.names()).finish()
    }
}

/// Cache key for a layout list; order-sensitive.
///
/// Each name is prefixed with its byte length, so `["a", "b"]` and `["a:b"]`
/// map to `1:a1:b` and `3:a:b`.
#[must_use]
pub fn chain_key(layouts: &[&str]) -> String {
    let mut key = String::new();
    for layout in layouts {
        push_part(&mut key, layout);
    }
    key
}

/// Resolves layout lists into chains, memoizing successful resolutions.
#[derive(Debug)]
pub struct ChainCache {
    chains: DashMap<String, Arc<LayoutChain>>,
    enabled: bool,
}

impl ChainCache {
    /// Create a cache. With `enabled` false every call resolves afresh.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            chains: DashMap::new(),
            enabled,
        }
    }

    /// Resolve `layouts` against `registry`.
    ///
    /// Resolution is atomic: the first name that does not resolve aborts with
    /// [`LayoutNotFound`] and nothing is cached.
    pub fn resolve(
        &self,
        registry: &TemplateRegistry,
        layouts: &[&str],
    ) -> Result<Arc<LayoutChain>, LayoutNotFound> {
        if layouts.is_empty() {
            return Ok(Arc::new(LayoutChain::default()));
        }

        let key = chain_key(layouts);
        if self.enabled {
            if let Some(chain) = self.chains.get(&key) {
                return Ok(Arc::clone(chain.value()));
            }
        }

        let templates = layouts
            .iter()
            .map(|name| {
                registry.lookup(name).ok_or_else(|| LayoutNotFound {
                    name: (*name).to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let chain = Arc::new(LayoutChain {
            templates,
        });

        if self.enabled {
            tracing::debug!("Cached layout chain {:?}", layouts);
            // Concurrent builders produce equivalent chains; last store wins
            self.chains.insert(key, Arc::clone(&chain));
        }

        Ok(chain)
    }

    /// Whether resolved chains are memoized.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a chain for `layouts` is cached.
    #[must_use]
    pub fn contains(&self, layouts: &[&str]) -> bool {
        self.chains.contains_key(&chain_key(layouts))
    }

    /// Number of cached chains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Whether no chain is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

impl Default for ChainCache {
    fn default() -> Self {
        Self::new(true)
    }
}
