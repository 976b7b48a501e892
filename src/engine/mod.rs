//! The render engine.
//!
//! An [`Engine`] owns a compiled [`TemplateRegistry`] plus the caches and
//! buffer pool used to render from it. It is built once by
//! [`EngineBuilder::build`] and then shared: every render method takes `&self`
//! and the engine is `Send + Sync`, so one instance (or cheap clones of it) can
//! serve any number of threads.
//!
//! # Render pipeline
//!
//! [`Engine::render`] runs these steps in order:
//!
//! 1. Refuse to render from an engine that was never built.
//! 2. Probe the render cache; a hit is written out unchanged.
//! 3. Look up the content template.
//! 4. Execute it into a pooled buffer with `T`, `ctx_val` and `component` bound
//!    from the [`RenderContext`].
//! 5. Resolve the layout list into a chain (memoized in the chain cache).
//! 6. Execute each layout in order, with `embed()` returning the output of the
//!    step before it.
//! 7. Store the result in the render cache, then write it to the sink.
//!
//! Nothing reaches the sink before step 7, so a failed render writes nothing.
//!
//! # Example
//!
//! ```no_run
//! use strata::engine::{Engine, RenderContext};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let engine = Engine::builder("templates").layouts(["layouts/base"]).build()?;
//!
//! let ctx = RenderContext::new().with_locale("en").with_value("request_id", "abc");
//! let html = engine.render_to_string(&ctx, "pages/home", &json!({"user": "Ada"}), &["layouts/base"])?;
//! println!("{html}");
//! # Ok(())
//! # }
//! ```

mod builder;
mod components;
mod context;
mod markup;

pub use builder::EngineBuilder;
pub use components::Props;
pub use context::RenderContext;
pub use markup::SafeMarkup;

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::{BindingRef, CacheKey, ChainCache, RenderCache, RenderCacheStats};
use crate::config::{CacheMode, EngineConfig};
use crate::constants::EMBED_FN;
use crate::core::{InitError, RenderError, RenderStage};
use crate::registry::TemplateRegistry;
use crate::templating::{EmbedFunction, FunctionRegistry, TemplateFunction};
use crate::utils::BufferPool;
use components::ComponentFunction;

/// Entry counts and probe counters of an engine's caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Render cache counters
    pub renders: RenderCacheStats,
    /// Memoized layout chains
    pub chains: usize,
}

/// A built template engine.
///
/// `Engine::default()` is an engine that was never built: every render fails
/// with [`RenderError::NotInitialized`]. Cloning shares the registry and caches.
#[derive(Clone, Default)]
pub struct Engine {
    inner: Option<Arc<EngineInner>>,
}

struct EngineInner {
    registry: Arc<TemplateRegistry>,
    functions: FunctionRegistry,
    chains: ChainCache,
    renders: RenderCache,
    pool: BufferPool,
    cache_mode: CacheMode,
    default_locale: String,
    origin: String,
}

impl Engine {
    /// Build an engine over the templates under `root` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an [`InitError`] if the directory cannot be loaded or compiled.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, InitError> {
        EngineBuilder::new(root).build()
    }

    /// Build an engine from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an [`InitError`] if the configured directory cannot be loaded or
    /// compiled.
    pub fn from_config(config: EngineConfig) -> Result<Self, InitError> {
        EngineBuilder::from_config(config).build()
    }

    /// Start configuring an engine over the templates under `root`.
    #[must_use]
    pub fn builder(root: impl Into<PathBuf>) -> EngineBuilder {
        EngineBuilder::new(root)
    }

    pub(crate) fn from_parts(
        registry: TemplateRegistry,
        functions: FunctionRegistry,
        config: &EngineConfig,
        origin: String,
    ) -> Self {
        Self {
            inner: Some(Arc::new(EngineInner {
                registry: Arc::new(registry),
                functions,
                chains: ChainCache::new(config.layout_cache),
                renders: RenderCache::new(),
                pool: BufferPool::new(config.pool),
                cache_mode: config.cache,
                default_locale: config.default_locale.clone(),
                origin,
            })),
        }
    }

    /// Whether this engine was built and can render.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.inner.is_some()
    }

    /// Render `name` wrapped in `layouts` into `out`.
    ///
    /// `binding` is converted to a JSON value: object fields become template
    /// variables, `()` or `None` render with no variables, and any other value
    /// is available as `value`. Layouts are applied in order, the first one
    /// wrapping the content template.
    ///
    /// The render cache key never includes `ctx` values or its translator. A
    /// cached output is returned as-is for a later call that differs only in
    /// `ctx`, so templates using `ctx_val` or `T` with per-request data need
    /// [`CacheMode::Disabled`].
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if the engine was never built, a template or
    /// layout is missing, the binding cannot be converted, a template fails, or
    /// `out` fails. In every case but the last, nothing was written to `out`.
    pub fn render<B, W>(
        &self,
        ctx: &RenderContext,
        out: &mut W,
        name: &str,
        binding: &B,
        layouts: &[&str],
    ) -> Result<(), RenderError>
    where
        B: Serialize + ?Sized,
        W: Write + ?Sized,
    {
        let inner = self.inner.as_deref().ok_or(RenderError::NotInitialized)?;
        let locale = ctx.locale().unwrap_or(&inner.default_locale);

        // Hard keys never look at the binding, so conversion waits until a miss.
        let mut converted = None;
        let key = match inner.cache_mode {
            CacheMode::Soft => {
                let binding_ref = match &*converted.insert(serde_json::to_value(binding)) {
                    Ok(value) => BindingRef::Value(value),
                    Err(_) => BindingRef::Opaque(std::any::type_name::<B>()),
                };
                Some(CacheKey::soft(locale, name, layouts, binding_ref))
            }
            CacheMode::Hard => Some(CacheKey::hard(locale, name, layouts)),
            CacheMode::Disabled => None,
        };

        if let Some(key) = &key {
            if let Some(cached) = inner.renders.get(key) {
                tracing::debug!("Render cache hit for '{}' ({} bytes)", name, cached.len());
                out.write_all(&cached)?;
                return Ok(());
            }
            tracing::debug!("Render cache miss for '{}'", name);
        }

        let value = converted.unwrap_or_else(|| serde_json::to_value(binding)).map_err(|source| {
            RenderError::Binding {
                template: name.to_string(),
                source,
            }
        })?;

        let content = inner.execute(ctx, locale, name, &value, layouts)?;

        if let Some(key) = key {
            inner.renders.put(key, Arc::clone(&content));
        }

        out.write_all(&content)?;
        Ok(())
    }

    /// Render into a new string.
    ///
    /// # Errors
    ///
    /// See [`Engine::render`].
    pub fn render_to_string<B>(
        &self,
        ctx: &RenderContext,
        name: &str,
        binding: &B,
        layouts: &[&str],
    ) -> Result<String, RenderError>
    where
        B: Serialize + ?Sized,
    {
        let mut out = Vec::new();
        self.render(ctx, &mut out, name, binding, layouts)?;
        // Templates are UTF-8 text and functions return strings
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Render into [`SafeMarkup`] for embedding in other trusted output.
    ///
    /// # Errors
    ///
    /// See [`Engine::render`].
    pub fn render_to_safe_markup<B>(
        &self,
        ctx: &RenderContext,
        name: &str,
        binding: &B,
        layouts: &[&str],
    ) -> Result<SafeMarkup, RenderError>
    where
        B: Serialize + ?Sized,
    {
        self.render_to_string(ctx, name, binding, layouts).map(SafeMarkup::trusted)
    }

    /// Names of the base functions available to templates, sorted.
    ///
    /// Empty for an engine that was never built.
    #[must_use]
    pub fn function_names(&self) -> Vec<String> {
        self.inner.as_ref().map(|inner| inner.functions.names()).unwrap_or_default()
    }

    /// Names of all registered templates, sorted.
    #[must_use]
    pub fn template_names(&self) -> Vec<String> {
        self.inner.as_ref().map(|inner| inner.registry.names()).unwrap_or_default()
    }

    /// Whether a template named `name` is registered.
    #[must_use]
    pub fn has_template(&self, name: &str) -> bool {
        self.inner.as_ref().is_some_and(|inner| inner.registry.contains(name))
    }

    /// Cache counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.inner
            .as_ref()
            .map(|inner| CacheStats {
                renders: inner.renders.stats(),
                chains: inner.chains.len(),
            })
            .unwrap_or_default()
    }

    /// Render cache addressing mode, `None` for an engine that was never built.
    #[must_use]
    pub fn cache_mode(&self) -> Option<CacheMode> {
        self.inner.as_ref().map(|inner| inner.cache_mode)
    }

    pub(crate) fn warm_layouts(&self, layouts: &[String]) {
        let Some(inner) = self.inner.as_deref() else {
            return;
        };

        for layout in layouts {
            match inner.chains.resolve(&inner.registry, &[layout.as_str()]) {
                Ok(_) => tracing::debug!("Preloaded layout '{}'", layout),
                Err(err) => tracing::warn!("Skipping common layout: {}", err),
            }
        }
    }
}

impl EngineInner {
    /// Steps 3 to 6 of the pipeline. Returns the final bytes.
    fn execute(
        &self,
        ctx: &RenderContext,
        locale: &str,
        name: &str,
        binding: &Value,
        layouts: &[&str],
    ) -> Result<Arc<[u8]>, RenderError> {
        let base = self.registry.lookup(name).ok_or_else(|| RenderError::TemplateNotFound {
            name: name.to_string(),
        })?;

        let components = Arc::new(ComponentFunction::new(
            Arc::clone(&self.registry),
            ctx.translate_function(locale),
            ctx.context_value_function(),
        ));
        let request_scope = components.scope();

        let mut current = self.pool.acquire();
        base.execute(&mut *current, binding, Arc::new(request_scope.clone()))
            .map_err(|err| RenderError::execution(name, RenderStage::Base, err))?;

        let chain = self.chains.resolve(&self.registry, layouts)?;
        for (index, layout) in chain.iter().enumerate() {
            let embedded: Arc<str> = Arc::from(String::from_utf8_lossy(&current));
            let scope = request_scope
                .clone()
                .with(EMBED_FN, Arc::new(EmbedFunction::new(embedded)) as Arc<dyn TemplateFunction>);

            let mut next = self.pool.acquire();
            layout
                .execute(&mut *next, binding, Arc::new(scope))
                .map_err(|err| RenderError::execution(layout.name(), RenderStage::Layout { index }, err))?;
            current = next;
        }

        tracing::debug!("Rendered '{}' through {} layout(s), {} bytes", name, chain.len(), current.len());
        Ok(Arc::from(current.as_slice()))
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.as_deref() {
            Some(inner) => f
                .debug_struct("Engine")
                .field("origin", &inner.origin)
                .field("templates", &inner.registry.len())
                .field("cache_mode", &inner.cache_mode)
                .field("layout_cache", &inner.chains.is_enabled())
                .field("default_locale", &inner.default_locale)
                .finish(),
            None => f.write_str("Engine(uninitialized)"),
        }
    }
}
