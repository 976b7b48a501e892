//! strata - template composition and render caching
//!
//! strata compiles a directory of templates once, then renders any of them
//! wrapped in an ordered list of layouts. Each layout receives the output of
//! the step before it through `embed()`. Rendered output is cached per engine,
//! keyed either by names only (hard) or by names plus a digest of the data
//! (soft).
//!
//! # Architecture Overview
//!
//! ```text
//! TemplateSource ──load──▶ TemplateCompiler ──compile──▶ TemplateRegistry
//!                                                           │
//!  Engine::render(ctx, out, name, binding, layouts)         │
//!     ├─ RenderCache probe ──hit──▶ out                     │
//!     ├─ base template ◀────────────────────────────────────┤
//!     ├─ ChainCache resolve layouts ◀───────────────────────┘
//!     ├─ layout 1 (embed = base) … layout N (embed = N-1)
//!     └─ RenderCache store ──▶ out
//! ```
//!
//! # Core Modules
//!
//! - [`engine`] - The [`Engine`](engine::Engine), its builder and render pipeline
//! - [`registry`] - Immutable map of compiled templates
//! - [`cache`] - Layout chain cache, render cache and cache keys
//! - [`templating`] - Backend traits, the Tera backend and template functions
//! - [`source`] - Where template text comes from (directory walk, memory)
//!
//! ## Supporting Modules
//! - [`config`] - `EngineConfig` and TOML loading
//! - [`core`] - Error types
//! - [`utils`] - Buffer pool
//! - [`cli`] - The `strata` command-line interface
//! - [`constants`] - Function names and defaults
//!
//! # Example
//!
//! ```no_run
//! use strata::engine::{Engine, RenderContext};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Home {
//!     user: String,
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! let engine = Engine::builder("templates").layouts(["layouts/base"]).build()?;
//! let html = engine.render_to_string(
//!     &RenderContext::new().with_locale("en"),
//!     "pages/home",
//!     &Home { user: "Ada".into() },
//!     &["layouts/base"],
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! With `templates/layouts/base.html`:
//!
//! ```text
//! <html><body>{{ embed() }}</body></html>
//! ```
//!
//! # Template Functions
//!
//! | Function | Description |
//! |----------|-------------|
//! | `T(key=..., args=[...])` | Translate through the render context's translator |
//! | `ctx_val(key=...)` | Per-request value from the render context |
//! | `embed()` | Output of the previous pipeline step (layouts only) |
//! | `component(name=..., props=...)` | Render another template inline |

pub mod cache;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod engine;
pub mod registry;
pub mod source;
pub mod templating;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{CacheMode, EngineConfig};
pub use crate::core::{InitError, RenderError};
pub use engine::{Engine, EngineBuilder, Props, RenderContext, SafeMarkup};
