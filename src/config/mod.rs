//! Engine configuration.
//!
//! An [`EngineConfig`] describes where templates live and how aggressively the
//! engine caches. It can be built in code (usually through
//! [`EngineBuilder`](crate::engine::EngineBuilder)) or loaded from a TOML file:
//!
//! ```toml
//! root = "templates"
//! extensions = [".html", ".txt"]
//! layouts = ["layouts/base"]
//! cache = "soft"          # "soft" | "hard" | "disabled"
//! layout_cache = true
//! autoescape = true
//! default_locale = "en"
//!
//! [pool]
//! max_retained = 64
//! max_buffer_capacity = 1048576
//! ```
//!
//! A relative `root` in a config file is resolved against the directory that
//! contains the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    CONFIG_PATH_ENV, DEFAULT_EXTENSION, DEFAULT_LOCALE, DEFAULT_POOL_MAX_BUFFER_CAPACITY,
    DEFAULT_POOL_MAX_RETAINED,
};

/// How rendered output is addressed in the render cache.
///
/// The mode is fixed per engine instance. Neither caching mode keys on the
/// [`RenderContext`](crate::engine::RenderContext) values or translator, so a
/// template whose output depends on `ctx_val` or a per-request translator must
/// be rendered by an engine with [`CacheMode::Disabled`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Key on locale, template name, layouts and a digest of the binding.
    #[default]
    Soft,
    /// Key on locale, template name and layouts only; bindings are ignored.
    ///
    /// Only suitable for templates whose output does not depend on the binding.
    Hard,
    /// Never store or probe rendered output.
    Disabled,
}

/// Buffer pool limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Idle buffers kept for reuse
    pub max_retained: usize,
    /// Buffers whose capacity grew beyond this are dropped on release
    pub max_buffer_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_retained: DEFAULT_POOL_MAX_RETAINED,
            max_buffer_capacity: DEFAULT_POOL_MAX_BUFFER_CAPACITY,
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec![DEFAULT_EXTENSION.to_string()]
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

const fn default_true() -> bool {
    true
}

/// Settings for building an [`Engine`](crate::engine::Engine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory walked for template files.
    #[serde(default)]
    pub root: PathBuf,

    /// Recognised file extensions, with or without the leading dot.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Layouts resolved into the chain cache while the engine is built.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layouts: Vec<String>,

    /// Render cache addressing mode.
    #[serde(default)]
    pub cache: CacheMode,

    /// Whether resolved layout chains are memoized.
    #[serde(default = "default_true")]
    pub layout_cache: bool,

    /// Escape HTML special characters in `{{ ... }}` output.
    #[serde(default = "default_true")]
    pub autoescape: bool,

    /// Locale used when a render context has none.
    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Buffer pool limits.
    #[serde(default)]
    pub pool: PoolConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            extensions: default_extensions(),
            layouts: Vec::new(),
            cache: CacheMode::default(),
            layout_cache: true,
            autoescape: true,
            default_locale: default_locale(),
            pool: PoolConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration for the given template root with defaults elsewhere.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for
    /// this schema.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine config from {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse engine config from {}", path.display()))?;

        if config.root.is_relative() && !config.root.as_os_str().is_empty() {
            if let Some(parent) = path.parent() {
                config.root = parent.join(&config.root);
            }
        }

        tracing::debug!(
            "Loaded engine config from {} (root={}, cache={:?})",
            path.display(),
            config.root.display(),
            config.cache
        );

        Ok(config)
    }

    /// Load from an explicit path, the `STRATA_CONFIG` environment variable, or
    /// fall back to defaults when neither is set.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured file cannot be loaded.
    pub fn load_with_optional(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from(path);
        }

        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(env_path) if !env_path.is_empty() => Self::load_from(Path::new(&env_path)),
            _ => Ok(Self::default()),
        }
    }

    /// Extensions normalised to carry a leading dot.
    #[must_use]
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.extensions
            .iter()
            .filter(|ext| !ext.trim().is_empty())
            .map(|ext| {
                let ext = ext.trim();
                if ext.starts_with('.') {
                    ext.to_string()
                } else {
                    format!(".{ext}")
                }
            })
            .collect()
    }
}
