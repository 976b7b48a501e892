//! Per-call render context.
//!
//! A [`RenderContext`] carries what a single render needs beyond the binding:
//! the locale, free-form string values for `ctx_val`, and an optional
//! [`Translator`] for `T`. It is cheap to clone; values and translator are
//! shared behind `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::templating::{ContextValueFunction, TemplateFunction, TranslateFunction, Translator};

/// Locale, request values and translator for one render.
#[derive(Clone, Default)]
pub struct RenderContext {
    locale: Option<String>,
    values: Arc<HashMap<String, String>>,
    translator: Option<Arc<dyn Translator>>,
}

impl RenderContext {
    /// Context with no locale, values or translator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render for `locale` instead of the engine default.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Add one value readable through `ctx_val(key=...)`.
    #[must_use]
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.values).insert(key.into(), value.into());
        self
    }

    /// Replace all values.
    #[must_use]
    pub fn with_values(mut self, values: HashMap<String, String>) -> Self {
        self.values = Arc::new(values);
        self
    }

    /// Use `translator` for `T(...)`.
    #[must_use]
    pub fn with_translator(mut self, translator: impl Translator + 'static) -> Self {
        self.translator = Some(Arc::new(translator));
        self
    }

    /// Use an already shared translator.
    #[must_use]
    pub fn with_shared_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Locale requested by the caller, if any.
    #[must_use]
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// Value for `key`, if set.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Whether a translator is attached.
    #[must_use]
    pub const fn has_translator(&self) -> bool {
        self.translator.is_some()
    }

    pub(crate) fn translate_function(&self, locale: &str) -> Arc<dyn TemplateFunction> {
        Arc::new(TranslateFunction::new(self.translator.clone(), locale))
    }

    pub(crate) fn context_value_function(&self) -> Arc<dyn TemplateFunction> {
        Arc::new(ContextValueFunction::new(Arc::clone(&self.values)))
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("RenderContext")
            .field("locale", &self.locale)
            .field("values", &keys)
            .field("translator", &self.translator.is_some())
            .finish()
    }
}
