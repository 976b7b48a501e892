//! Components: templates rendered from inside other templates.
//!
//! `component(name="widgets/card", props=card)` renders the named template with
//! `props` as its binding and inserts the output unescaped. Without a `props`
//! argument, every keyword argument other than `name` becomes a prop:
//!
//! ```text
//! {{ component(name="widgets/badge", label="new", count=3) }}
//! ```
//!
//! A component sees the same `T` and `ctx_val` as the template that called it,
//! never `embed`. Nesting is limited to [`MAX_COMPONENT_DEPTH`] levels so that a
//! component including itself fails instead of overflowing the stack.

use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::constants::{COMPONENT_FN, CONTEXT_VALUE_FN, MAX_COMPONENT_DEPTH, TRANSLATE_FN};
use crate::core::BoxError;
use crate::registry::TemplateRegistry;
use crate::templating::{FunctionArgs, FunctionScope, TemplateFunction, string_arg};

/// `component(...)` bound to a registry and the caller's request functions.
pub(crate) struct ComponentFunction {
    registry: Arc<TemplateRegistry>,
    translate: Arc<dyn TemplateFunction>,
    context_value: Arc<dyn TemplateFunction>,
    depth: usize,
}

impl ComponentFunction {
    pub(crate) fn new(
        registry: Arc<TemplateRegistry>,
        translate: Arc<dyn TemplateFunction>,
        context_value: Arc<dyn TemplateFunction>,
    ) -> Self {
        Self {
            registry,
            translate,
            context_value,
            depth: 0,
        }
    }

    /// Scope for a template executing at this function's depth.
    pub(crate) fn scope(self: &Arc<Self>) -> FunctionScope {
        FunctionScope::new()
            .with(TRANSLATE_FN, Arc::clone(&self.translate))
            .with(CONTEXT_VALUE_FN, Arc::clone(&self.context_value))
            .with(COMPONENT_FN, Arc::clone(self) as Arc<dyn TemplateFunction>)
    }

    fn nested(&self) -> Arc<Self> {
        Arc::new(Self {
            registry: Arc::clone(&self.registry),
            translate: Arc::clone(&self.translate),
            context_value: Arc::clone(&self.context_value),
            depth: self.depth + 1,
        })
    }
}

impl TemplateFunction for ComponentFunction {
    fn call(&self, args: &FunctionArgs) -> Result<Value, BoxError> {
        let name = string_arg(COMPONENT_FN, args, "name")?;

        if self.depth >= MAX_COMPONENT_DEPTH {
            return Err(format!(
                "Component '{name}' exceeds the maximum nesting depth of {MAX_COMPONENT_DEPTH}"
            )
            .into());
        }

        let template = self
            .registry
            .lookup(name)
            .ok_or_else(|| format!("Component template not found: {name}"))?;

        let props = match args.get("props") {
            Some(props) => props.clone(),
            None => Value::Object(
                args.iter()
                    .filter(|(key, _)| key.as_str() != "name")
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
            ),
        };

        let mut out = Vec::new();
        template.execute(&mut out, &props, Arc::new(self.nested().scope()))?;
        Ok(Value::String(String::from_utf8(out)?))
    }

    fn is_safe(&self) -> bool {
        true
    }
}

/// Builder for component props and other map-shaped bindings.
///
/// ```
/// use strata::engine::Props;
///
/// let defaults = Props::new().with("size", "md").with("rounded", true);
/// let props = Props::merge([defaults, Props::new().with("size", "lg")]);
/// assert_eq!(props.get("size"), Some(&serde_json::json!("lg")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Props(Map<String, Value>);

impl Props {
    /// Empty props.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`. Values that cannot be represented as JSON are stored as `null`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key` in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Serialize) {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.0.insert(key.into(), value);
    }

    /// Combine several prop sets; later sets override earlier ones key by key.
    #[must_use]
    pub fn merge(props: impl IntoIterator<Item = Props>) -> Self {
        let mut merged = Map::new();
        for set in props {
            merged.extend(set.0);
        }
        Self(merged)
    }

    /// Value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of props.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no prop is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert into a JSON object.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Props> for Value {
    fn from(props: Props) -> Self {
        props.into_value()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(key, value)| (key.into(), value)).collect())
    }
}
