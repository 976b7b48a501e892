//! Test utilities for strata
//!
//! Helpers shared by unit tests and the integration suite: a once-only tracing
//! subscriber and a temporary template directory builder.
//!
//! # Example
//!
//! ```rust,no_run
//! use strata::test_utils::TemplateDirFixture;
//!
//! let fixture = TemplateDirFixture::new()
//!     .unwrap()
//!     .with_template("pages/home.html", "Hello {{ name }}")
//!     .unwrap()
//!     .with_template("layouts/base.html", "<main>{{ embed() }}</main>")
//!     .unwrap();
//!
//! let engine = fixture.engine().unwrap();
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::engine::{Engine, EngineBuilder};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; does nothing when neither is
/// set. Safe to call from every test.
///
/// ```bash
/// RUST_LOG=strata=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(true)
            .try_init();
    });
}

/// A temporary template root populated file by file.
///
/// The directory is removed when the fixture is dropped.
#[derive(Debug)]
pub struct TemplateDirFixture {
    dir: TempDir,
}

impl TemplateDirFixture {
    /// Create an empty template root.
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("Failed to create temporary template directory")?;
        Ok(Self {
            dir,
        })
    }

    /// Write `content` to `relative` (parents are created).
    pub fn with_template(self, relative: &str, content: &str) -> Result<Self> {
        self.write(relative, content)?;
        Ok(self)
    }

    /// Write `content` to `relative` in place.
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Template root.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Builder rooted at this directory.
    #[must_use]
    pub fn builder(&self) -> EngineBuilder {
        EngineBuilder::new(self.path())
    }

    /// Engine with default settings rooted at this directory.
    pub fn engine(&self) -> Result<Engine> {
        Ok(self.builder().build()?)
    }

    /// A small site: a page, a partial component and two nested layouts.
    pub fn site() -> Result<Self> {
        Self::new()?
            .with_template("pages/home.html", "<h1>{{ T(key=\"welcome\") }}, {{ name }}</h1>")?
            .with_template("pages/about.html", "<p>About {{ ctx_val(key=\"site\") }}</p>")?
            .with_template("pages/list.html", "{% for item in items %}{{ component(name=\"partials/item\", label=item) }}{% endfor %}")?
            .with_template("partials/item.html", "<li>{{ label }}</li>")?
            .with_template("layouts/main.html", "<main>{{ embed() }}</main>")?
            .with_template("layouts/root.html", "<html>{{ embed() }}</html>")
    }
}
