//! Tera backend.
//!
//! All templates of an engine are compiled into one [`Tera`] instance so that
//! `{% extends %}`, `{% include %}` and macros can reference each other by
//! logical name. Each registered name is exposed as a [`TeraTemplate`] handle
//! sharing that instance.
//!
//! Tera registers functions globally on the instance, which does not fit
//! functions that change on every call (`embed` differs for every layout of
//! every render). Those names are registered as [`ScopedFunction`] dispatchers
//! that resolve the implementation from the calling thread's active
//! [`FunctionScope`](super::FunctionScope), see [`super::scope`].

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::sync::Arc;
use tera::{Context as TeraContext, Tera};

use super::functions::{FunctionRegistry, FunctionScope, TemplateFunction};
use super::{CompiledTemplate, TemplateCompiler, scope};
use crate::constants::{BINDING_VALUE_KEY, SCOPED_FUNCTIONS};
use crate::core::{BoxError, InitError, format_error_chain};
use crate::registry::TemplateRegistry;
use crate::source::TemplateFile;

/// Compiles template registrations with Tera.
#[derive(Debug, Clone, Copy)]
pub struct TeraCompiler {
    autoescape: bool,
}

impl TeraCompiler {
    /// Create a compiler.
    ///
    /// With `autoescape` on, `{{ ... }}` output of every template is HTML
    /// escaped regardless of its name. Output of safe functions (`embed`,
    /// `component`) is never escaped.
    #[must_use]
    pub const fn new(autoescape: bool) -> Self {
        Self {
            autoescape,
        }
    }
}

impl Default for TeraCompiler {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TemplateCompiler for TeraCompiler {
    fn compile(
        &self,
        files: Vec<TemplateFile>,
        functions: &FunctionRegistry,
    ) -> Result<TemplateRegistry, InitError> {
        let mut tera = Tera::default();

        // Template names carry no extension, so escaping cannot be keyed on suffix.
        if self.autoescape {
            tera.autoescape_on(vec![""]);
        } else {
            tera.autoescape_on(vec![]);
        }

        for (name, function) in functions.iter() {
            tera.register_function(
                name,
                TeraFunction {
                    name: name.to_string(),
                    inner: Arc::clone(function),
                },
            );
        }
        for &(name, safe) in SCOPED_FUNCTIONS {
            tera.register_function(
                name,
                ScopedFunction {
                    name,
                    safe,
                    fallback: functions.get(name),
                },
            );
        }

        // Later registrations win; BTreeMap keeps compilation order stable.
        let sources: BTreeMap<String, String> =
            files.into_iter().map(|file| (file.name, file.content)).collect();

        tera.add_raw_templates(sources.iter().map(|(name, content)| (name.as_str(), content.as_str())))
            .map_err(|err| InitError::TemplateParsingFailed {
                message: format_error_chain(&err),
                source: Box::new(err),
            })?;

        let tera = Arc::new(tera);
        let templates = sources.into_keys().map(|name| {
            Arc::new(TeraTemplate {
                name,
                tera: Arc::clone(&tera),
            }) as Arc<dyn CompiledTemplate>
        });

        Ok(TemplateRegistry::new(templates))
    }
}

/// Handle to one template inside a shared [`Tera`] instance.
pub struct TeraTemplate {
    name: String,
    tera: Arc<Tera>,
}

impl CompiledTemplate for TeraTemplate {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(
        &self,
        out: &mut dyn Write,
        binding: &Value,
        scope: Arc<FunctionScope>,
    ) -> Result<(), BoxError> {
        let context = binding_context(binding)?;
        let _guard = scope::enter(scope);
        self.tera.render_to(&self.name, &context, out)?;
        Ok(())
    }
}

/// Turn a binding into a Tera context.
///
/// Object fields become top-level variables. `null` yields an empty context.
/// Any other value is available as `value`.
pub fn binding_context(binding: &Value) -> Result<TeraContext, BoxError> {
    match binding {
        Value::Object(_) => Ok(TeraContext::from_value(binding.clone())?),
        Value::Null => Ok(TeraContext::new()),
        other => {
            let mut context = TeraContext::new();
            context.insert(BINDING_VALUE_KEY, other);
            Ok(context)
        }
    }
}

/// A base function exposed to Tera.
struct TeraFunction {
    name: String,
    inner: Arc<dyn TemplateFunction>,
}

impl tera::Function for TeraFunction {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        self.inner.call(args).map_err(|err| {
            tera::Error::msg(format!("Function `{}` failed: {}", self.name, format_error_chain(err.as_ref())))
        })
    }

    fn is_safe(&self) -> bool {
        self.inner.is_safe()
    }
}

/// Dispatcher for a function rebound on every execution.
///
/// Falls back to the base registry's function of the same name when the
/// active scope does not bind one.
struct ScopedFunction {
    name: &'static str,
    safe: bool,
    fallback: Option<Arc<dyn TemplateFunction>>,
}

impl tera::Function for ScopedFunction {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let function = scope::lookup(self.name).or_else(|| self.fallback.clone()).ok_or_else(|| {
            tera::Error::msg(format!("Function `{}` is not available in this template", self.name))
        })?;

        function.call(args).map_err(|err| {
            tera::Error::msg(format!("Function `{}` failed: {}", self.name, format_error_chain(err.as_ref())))
        })
    }

    fn is_safe(&self) -> bool {
        self.safe
    }
}
