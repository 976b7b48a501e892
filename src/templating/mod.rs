//! Template backend seam.
//!
//! The engine never interprets template syntax. It works against two traits:
//!
//! - [`TemplateCompiler`] turns source registrations plus the base
//!   [`FunctionRegistry`] into a [`TemplateRegistry`].
//! - [`CompiledTemplate`] executes one template into a writer, given a binding
//!   value and the per-call [`FunctionScope`].
//!
//! The bundled backend is [`TeraCompiler`] (see [`renderer`]). Any other
//! backend works as long as `execute` is safe to call concurrently on the same
//! template, with each call using only the scope it was handed.
//!
//! # Template-facing functions
//!
//! | Function | Where | Returns |
//! |----------|-------|---------|
//! | `T(key, args)` | everywhere | translation of `key` for the render locale |
//! | `ctx_val(key)` | everywhere | a per-request value from the render context |
//! | `embed()` | layouts | output of the previous step, unescaped |
//! | `component(name, props)` | everywhere | another template rendered with `props`, unescaped |

pub mod functions;
pub mod renderer;
pub mod scope;

use serde_json::Value;
use std::io::Write;
use std::sync::Arc;

use crate::core::{BoxError, InitError};
use crate::registry::TemplateRegistry;
use crate::source::TemplateFile;

pub use functions::{
    ContextValueFunction, EmbedFunction, FnFunction, FunctionArgs, FunctionRegistry,
    FunctionScope, TemplateFunction, TranslateFunction, Translator, string_arg,
};
pub use renderer::TeraCompiler;

/// An executable template.
pub trait CompiledTemplate: Send + Sync {
    /// Logical name of the template.
    fn name(&self) -> &str;

    /// Execute into `out` with `binding` as data and `scope` as the per-call functions.
    ///
    /// On error, `out` may hold partial output; callers discard it.
    fn execute(
        &self,
        out: &mut dyn Write,
        binding: &Value,
        scope: Arc<FunctionScope>,
    ) -> Result<(), BoxError>;
}

/// Compiles source registrations into a registry.
pub trait TemplateCompiler: Send + Sync {
    /// Compile every file. Any compilation failure fails the whole build.
    fn compile(
        &self,
        files: Vec<TemplateFile>,
        functions: &FunctionRegistry,
    ) -> Result<TemplateRegistry, InitError>;
}
