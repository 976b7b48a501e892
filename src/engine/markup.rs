//! Trusted markup wrapper.

use serde::Serialize;
use std::fmt;

/// Rendered output that is already safe to embed without escaping.
///
/// Returned by [`Engine::render_to_safe_markup`](super::Engine::render_to_safe_markup)
/// so callers can tell engine output apart from arbitrary strings. It
/// serializes as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct SafeMarkup(String);

impl SafeMarkup {
    /// Mark `markup` as trusted.
    ///
    /// Only use this for content the caller produced or sanitised itself.
    #[must_use]
    pub fn trusted(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    /// Markup text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the markup text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether the markup is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SafeMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SafeMarkup {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<SafeMarkup> for String {
    fn from(markup: SafeMarkup) -> Self {
        markup.0
    }
}
