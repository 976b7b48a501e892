//! Registry of compiled templates.
//!
//! Built once by a [`TemplateCompiler`](crate::templating::TemplateCompiler) and
//! never mutated afterwards. The engine holds it behind an `Arc`, so lookups
//! from any number of threads are plain hash map reads.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::templating::CompiledTemplate;

/// Compiled templates indexed by logical name.
#[derive(Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Arc<dyn CompiledTemplate>>,
}

impl TemplateRegistry {
    /// Build a registry from compiled templates.
    ///
    /// Templates are registered under [`CompiledTemplate::name`]; when two share
    /// a name the later one wins.
    pub fn new(templates: impl IntoIterator<Item = Arc<dyn CompiledTemplate>>) -> Self {
        let templates = templates
            .into_iter()
            .map(|template| (template.name().to_string(), template))
            .collect();
        Self {
            templates,
        }
    }

    /// Look up a template by name.
    ///
    /// A miss is not an error here; callers decide whether it is fatal.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn CompiledTemplate>> {
        self.templates.get(name).cloned()
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether no template is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.templates.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRegistry").field("templates", &self.names()).finish()
    }
}
