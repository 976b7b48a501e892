//! Command-line interface for strata.
//!
//! ```bash
//! # Render a page through two layouts with JSON data
//! strata render pages/home --dir templates -l layouts/main -l layouts/root --data home.json
//!
//! # List every registered template name
//! strata list --dir templates
//!
//! # Use a config file for root, extensions and cache settings
//! strata --config strata.toml render pages/home
//! ```
//!
//! # Global Options
//!
//! - `--verbose` - Debug logging on stderr
//! - `--quiet` - No logging at all
//! - `--config` - Engine config file (falls back to `STRATA_CONFIG`)
//!
//! Command-line flags override values loaded from the config file.

mod list;
mod render;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::{CacheMode, EngineConfig};
use crate::engine::{Engine, EngineBuilder};

pub use list::ListCommand;
pub use render::RenderCommand;

/// Root command.
#[derive(Parser, Debug)]
#[command(
    name = "strata",
    about = "Render templates through layout chains",
    version,
    long_about = "strata compiles a directory of templates once and renders them, optionally wrapped in layouts, with render caching."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all logging
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to an engine config file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a template to stdout
    Render(RenderCommand),
    /// List registered template names
    List(ListCommand),
}

/// Engine options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    /// Template root directory
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Template file extension; repeat for several
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Key the render cache on names only, ignoring data
    #[arg(long)]
    pub hard_cache: bool,

    /// Do not HTML-escape `{{ ... }}` output
    #[arg(long)]
    pub no_autoescape: bool,
}

impl EngineArgs {
    /// Apply command-line overrides on top of `config`.
    #[must_use]
    pub fn apply(&self, mut config: EngineConfig) -> EngineConfig {
        if let Some(dir) = &self.dir {
            config.root.clone_from(dir);
        }
        if !self.extensions.is_empty() {
            config.extensions.clone_from(&self.extensions);
        }
        if self.hard_cache {
            config.cache = CacheMode::Hard;
        }
        if self.no_autoescape {
            config.autoescape = false;
        }
        config
    }

    /// Build an engine from `config` with these overrides.
    ///
    /// # Errors
    ///
    /// Returns an error when the engine cannot be built.
    pub fn build_engine(&self, config: EngineConfig) -> Result<Engine> {
        let config = self.apply(config);
        let root = config.root.display().to_string();
        let engine = EngineBuilder::from_config(config).build()?;
        tracing::debug!("Engine built from '{}': {:?}", root, engine);
        Ok(engine)
    }
}

impl Cli {
    /// Log filter selected by `--verbose` / `--quiet`.
    ///
    /// `None` means logging stays off.
    #[must_use]
    pub const fn log_level(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            None
        } else {
            Some("warn")
        }
    }

    /// Run the selected command.
    ///
    /// # Errors
    ///
    /// Returns any configuration, build or render error.
    pub fn execute(self) -> Result<()> {
        self.init_logging();

        let config = EngineConfig::load_with_optional(self.config.as_deref())?;
        match self.command {
            Commands::Render(cmd) => cmd.execute(config),
            Commands::List(cmd) => cmd.execute(config),
        }
    }

    fn init_logging(&self) {
        let Some(level) = self.log_level() else {
            return;
        };

        // RUST_LOG wins over the flag-derived default unless --verbose was given.
        let filter = if self.verbose {
            EnvFilter::new(level)
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}
