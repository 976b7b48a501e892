//! Engine construction.

use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

use super::Engine;
use crate::config::{CacheMode, EngineConfig, PoolConfig};
use crate::core::{BoxError, InitError};
use crate::source::{DirectorySource, TemplateSource};
use crate::templating::{
    FnFunction, FunctionArgs, FunctionRegistry, TemplateCompiler, TemplateFunction, TeraCompiler,
};

/// Configures and builds an [`Engine`].
///
/// Settings start from an [`EngineConfig`] and can be adjusted one by one:
///
/// ```no_run
/// use strata::engine::EngineBuilder;
/// use serde_json::json;
///
/// # fn main() -> anyhow::Result<()> {
/// let engine = EngineBuilder::new("templates")
///     .extensions([".html", ".txt"])
///     .layouts(["layouts/base"])
///     .hard_cache(true)
///     .function("year", |_| Ok(json!(2024)))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct EngineBuilder {
    config: EngineConfig,
    functions: FunctionRegistry,
    source: Option<Box<dyn TemplateSource>>,
    compiler: Option<Box<dyn TemplateCompiler>>,
}

impl EngineBuilder {
    /// Builder over the templates under `root` with default settings.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::from_config(EngineConfig::new(root))
    }

    /// Builder starting from a full configuration.
    #[must_use]
    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            config,
            functions: FunctionRegistry::new(),
            source: None,
            compiler: None,
        }
    }

    /// Accept these file extensions instead of the default `.html`.
    #[must_use]
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Resolve these layouts into the chain cache while building.
    #[must_use]
    pub fn layouts<I, S>(mut self, layouts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.layouts = layouts.into_iter().map(Into::into).collect();
        self
    }

    /// Set the render cache mode.
    #[must_use]
    pub fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.config.cache = mode;
        self
    }

    /// Switch between hard and soft render caching.
    #[must_use]
    pub fn hard_cache(self, enabled: bool) -> Self {
        self.cache_mode(if enabled {
            CacheMode::Hard
        } else {
            CacheMode::Soft
        })
    }

    /// Memoize resolved layout chains (on by default).
    #[must_use]
    pub fn layout_cache(mut self, enabled: bool) -> Self {
        self.config.layout_cache = enabled;
        self
    }

    /// Escape HTML in `{{ ... }}` output (on by default).
    #[must_use]
    pub fn autoescape(mut self, enabled: bool) -> Self {
        self.config.autoescape = enabled;
        self
    }

    /// Locale used when a render context names none.
    #[must_use]
    pub fn default_locale(mut self, locale: impl Into<String>) -> Self {
        self.config.default_locale = locale.into();
        self
    }

    /// Buffer pool limits.
    #[must_use]
    pub fn pool(mut self, pool: PoolConfig) -> Self {
        self.config.pool = pool;
        self
    }

    /// Add a base function backed by a closure.
    #[must_use]
    pub fn function<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&FunctionArgs) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.functions.register(name, Arc::new(FnFunction::new(f)));
        self
    }

    /// Add a base function.
    #[must_use]
    pub fn function_object(mut self, name: impl Into<String>, function: Arc<dyn TemplateFunction>) -> Self {
        self.functions.register(name, function);
        self
    }

    /// Add every function of `functions`, replacing same-named ones.
    #[must_use]
    pub fn functions(mut self, functions: &FunctionRegistry) -> Self {
        self.functions.extend(functions);
        self
    }

    /// Load templates from `source` instead of walking the configured root.
    #[must_use]
    pub fn source(mut self, source: impl TemplateSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Compile with `compiler` instead of the bundled Tera backend.
    #[must_use]
    pub fn compiler(mut self, compiler: impl TemplateCompiler + 'static) -> Self {
        self.compiler = Some(Box::new(compiler));
        self
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Load, compile and warm up.
    ///
    /// # Errors
    ///
    /// Returns an [`InitError`] when the root is unset or missing, a file cannot
    /// be read, no template is found, or any template fails to compile.
    pub fn build(self) -> Result<Engine, InitError> {
        let source: Box<dyn TemplateSource> = match self.source {
            Some(source) => source,
            None => Box::new(DirectorySource::new(
                self.config.root.clone(),
                self.config.normalized_extensions(),
            )),
        };
        let origin = source.describe();

        let files = source.load()?;
        if files.is_empty() {
            return Err(InitError::NoTemplatesParsed {
                origin,
            });
        }
        tracing::debug!("Loaded {} template file(s) from {}", files.len(), origin);

        let compiler: Box<dyn TemplateCompiler> = match self.compiler {
            Some(compiler) => compiler,
            None => Box::new(TeraCompiler::new(self.config.autoescape)),
        };
        let registry = compiler.compile(files, &self.functions)?;
        if registry.is_empty() {
            return Err(InitError::NoTemplatesParsed {
                origin,
            });
        }

        let template_count = registry.len();
        let engine = Engine::from_parts(registry, self.functions, &self.config, origin.clone());
        engine.warm_layouts(&self.config.layouts);

        tracing::info!(
            "Template engine ready: {} templates from {} (cache: {:?}, layout cache: {})",
            template_count,
            origin,
            self.config.cache,
            if self.config.layout_cache {
                "on"
            } else {
                "off"
            }
        );

        Ok(engine)
    }
}
