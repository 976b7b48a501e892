//! Functions callable from templates.
//!
//! There are two kinds:
//! - **Base functions** live in a [`FunctionRegistry`] handed to the engine at
//!   construction. They are shared by every render.
//! - **Scoped functions** live in a [`FunctionScope`] built for one template
//!   execution: the translator `T`, the context accessor `ctx_val`, the layout
//!   `embed` point and `component`. The registry carries placeholder versions of
//!   `T` and `ctx_val` that are used only when no scope overrides them.
//!
//! Tera passes keyword arguments only, so templates call these as
//! `{{ T(key="greeting", args=["Ada"]) }}` or `{{ ctx_val(key="request_id") }}`.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::constants::{CONTEXT_VALUE_FN, EMBED_FN, TRANSLATE_FN};
use crate::core::BoxError;

/// Keyword arguments as passed by the template backend.
pub type FunctionArgs = HashMap<String, Value>;

/// A named callable exposed to templates.
pub trait TemplateFunction: Send + Sync {
    /// Invoke the function.
    fn call(&self, args: &FunctionArgs) -> Result<Value, BoxError>;

    /// Whether the output is trusted markup that must not be escaped.
    fn is_safe(&self) -> bool {
        false
    }
}

/// Adapter turning a closure into a [`TemplateFunction`].
pub struct FnFunction<F> {
    f: F,
    safe: bool,
}

impl<F> FnFunction<F>
where
    F: Fn(&FunctionArgs) -> Result<Value, BoxError> + Send + Sync,
{
    /// Wrap a closure whose output is escaped as usual.
    pub const fn new(f: F) -> Self {
        Self {
            f,
            safe: false,
        }
    }

    /// Wrap a closure whose output is inserted verbatim.
    pub const fn safe(f: F) -> Self {
        Self {
            f,
            safe: true,
        }
    }
}

impl<F> TemplateFunction for FnFunction<F>
where
    F: Fn(&FunctionArgs) -> Result<Value, BoxError> + Send + Sync,
{
    fn call(&self, args: &FunctionArgs) -> Result<Value, BoxError> {
        (self.f)(args)
    }

    fn is_safe(&self) -> bool {
        self.safe
    }
}

/// Fetch a required string argument.
pub fn string_arg<'a>(function: &str, args: &'a FunctionArgs, name: &str) -> Result<&'a str, BoxError> {
    match args.get(name) {
        Some(Value::String(value)) => Ok(value),
        Some(other) => {
            Err(format!("`{function}` expects `{name}` to be a string, got {other}").into())
        }
        None => Err(format!("`{function}` requires a `{name}` argument").into()),
    }
}

/// Resolves translation keys for a locale.
///
/// Supplied by the caller through the render context; this crate does not
/// ship catalog lookup.
pub trait Translator: Send + Sync {
    /// Translate `key` for `locale`, interpolating `args` as the catalog sees fit.
    fn translate(&self, locale: &str, key: &str, args: &[Value]) -> String;
}

/// Base functions shared by every render.
#[derive(Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn TemplateFunction>>,
}

impl FunctionRegistry {
    /// Registry holding only the `T` and `ctx_val` placeholders.
    ///
    /// The `T` placeholder echoes its key; `ctx_val` yields an empty string.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_fn(TRANSLATE_FN, |args| {
            Ok(Value::String(string_arg(TRANSLATE_FN, args, "key")?.to_string()))
        });
        registry.register_fn(CONTEXT_VALUE_FN, |_| Ok(Value::String(String::new())));
        registry
    }

    /// Registry with no functions at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            functions: HashMap::new(),
        }
    }

    /// Register a function, replacing any previous one with the same name.
    pub fn register(&mut self, name: impl Into<String>, function: Arc<dyn TemplateFunction>) {
        self.functions.insert(name.into(), function);
    }

    /// Register a closure.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&FunctionArgs) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.register(name, Arc::new(FnFunction::new(f)));
    }

    /// Copy every function from `other` into this registry; `other` wins on conflicts.
    pub fn extend(&mut self, other: &FunctionRegistry) {
        for (name, function) in &other.functions {
            self.functions.insert(name.clone(), Arc::clone(function));
        }
    }

    /// Look up a function.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn TemplateFunction>> {
        self.functions.get(name).cloned()
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Iterate over `(name, function)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn TemplateFunction>)> {
        self.functions.iter().map(|(name, function)| (name.as_str(), function))
    }

    /// Number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry").field("functions", &self.names()).finish()
    }
}

/// Functions bound for a single template execution.
#[derive(Clone, Default)]
pub struct FunctionScope {
    functions: HashMap<String, Arc<dyn TemplateFunction>>,
}

impl FunctionScope {
    /// Empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` for this scope.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, function: Arc<dyn TemplateFunction>) -> Self {
        self.functions.insert(name.into(), function);
        self
    }

    /// Look up a scoped function.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn TemplateFunction>> {
        self.functions.get(name).cloned()
    }

    /// Whether `name` is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

impl fmt::Debug for FunctionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("FunctionScope").field("functions", &names).finish()
    }
}

/// `T(key=..., args=[...])` bound to a translator and locale.
pub struct TranslateFunction {
    translator: Option<Arc<dyn Translator>>,
    locale: String,
}

impl TranslateFunction {
    /// Bind a translator for `locale`; without one the key is echoed back.
    pub fn new(translator: Option<Arc<dyn Translator>>, locale: impl Into<String>) -> Self {
        Self {
            translator,
            locale: locale.into(),
        }
    }
}

impl TemplateFunction for TranslateFunction {
    fn call(&self, args: &FunctionArgs) -> Result<Value, BoxError> {
        let key = string_arg(TRANSLATE_FN, args, "key")?;
        let extra = match args.get("args") {
            Some(Value::Array(values)) => values.as_slice(),
            Some(other) => std::slice::from_ref(other),
            None => &[],
        };

        let translated = match &self.translator {
            Some(translator) => translator.translate(&self.locale, key, extra),
            None => key.to_string(),
        };
        Ok(Value::String(translated))
    }
}

/// `ctx_val(key=...)` reading the per-request values of a render context.
pub struct ContextValueFunction {
    values: Arc<HashMap<String, String>>,
}

impl ContextValueFunction {
    /// Bind a value map.
    pub const fn new(values: Arc<HashMap<String, String>>) -> Self {
        Self {
            values,
        }
    }
}

impl TemplateFunction for ContextValueFunction {
    fn call(&self, args: &FunctionArgs) -> Result<Value, BoxError> {
        let key = string_arg(CONTEXT_VALUE_FN, args, "key")?;
        Ok(Value::String(self.values.get(key).cloned().unwrap_or_default()))
    }
}

/// `embed()` returning the output of the previous pipeline step.
pub struct EmbedFunction {
    content: Arc<str>,
}

impl EmbedFunction {
    /// Bind the content a layout wraps.
    pub const fn new(content: Arc<str>) -> Self {
        Self {
            content,
        }
    }
}

impl TemplateFunction for EmbedFunction {
    fn call(&self, args: &FunctionArgs) -> Result<Value, BoxError> {
        if !args.is_empty() {
            return Err(format!("`{EMBED_FN}` takes no arguments").into());
        }
        Ok(Value::String(self.content.to_string()))
    }

    fn is_safe(&self) -> bool {
        true
    }
}
