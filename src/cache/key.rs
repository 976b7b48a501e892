//! Render cache keys.
//!
//! A key identifies one rendered output. How much goes into it depends on the
//! engine's [`CacheMode`](crate::config::CacheMode):
//!
//! - **Hard**: plain text `2:en10:pages/home::2:l12:l2`, each part prefixed
//!   with its byte length. No hashing; the binding is ignored entirely.
//! - **Soft**: a SHA-256 digest over the locale, template name, layout names and
//!   a canonical encoding of the binding, hex encoded.
//!
//! # Binding encoding
//!
//! Bindings are encoded by shape so that values that are equal by content
//! produce equal digests regardless of how they were built:
//!
//! | Shape | Encoding |
//! |-------|----------|
//! | empty (`null`) | fixed sentinel |
//! | scalar | type tag + textual form |
//! | sequence | tag + length + each element |
//! | mapping | tag + length + entries sorted by key |
//! | opaque | tag + type name |
//!
//! Every string and collection is length-prefixed, so adjacent fields cannot
//! run into each other (`["ab", "c"]` and `["a", "bc"]` differ). Bindings that
//! could not be converted into a JSON value are keyed as opaque: key
//! construction never fails.

use serde_json::{Number, Value};
use sha2::{Digest, Sha256};
use std::fmt::{self, Write as _};

use crate::constants::KEY_PART_SEPARATOR;

/// What the key builder knows about a binding.
#[derive(Debug, Clone, Copy)]
pub enum BindingRef<'a> {
    /// The binding converted to a JSON value.
    Value(&'a Value),
    /// The binding could not be converted; only its type name is known.
    Opaque(&'a str),
}

/// Shape categories used by the canonical binding encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingShape {
    /// `null`
    Empty,
    /// Strings, numbers and booleans
    Scalar,
    /// Arrays
    Sequence,
    /// Objects
    Mapping,
    /// Anything that could not be inspected
    Opaque,
}

impl BindingRef<'_> {
    /// Shape category of the binding.
    #[must_use]
    pub const fn shape(&self) -> BindingShape {
        match self {
            BindingRef::Value(Value::Null) => BindingShape::Empty,
            BindingRef::Value(Value::Bool(_) | Value::Number(_) | Value::String(_)) => {
                BindingShape::Scalar
            }
            BindingRef::Value(Value::Array(_)) => BindingShape::Sequence,
            BindingRef::Value(Value::Object(_)) => BindingShape::Mapping,
            BindingRef::Opaque(_) => BindingShape::Opaque,
        }
    }
}

/// Key of one render cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Name-addressed key ignoring the binding.
    #[must_use]
    ///
    /// Parts are length-prefixed, so a layout named `a:b` never collides with
    /// the pair `a`, `b`.
    pub fn hard(locale: &str, name: &str, layouts: &[&str]) -> Self {
        let mut key = String::new();
        push_part(&mut key, locale);
        push_part(&mut key, name);
        key.push_str("::");
        for layout in layouts {
            push_part(&mut key, layout);
        }
        Self(key)
    }

    /// Content-addressed key including a digest of the binding.
    #[must_use]
    pub fn soft(locale: &str, name: &str, layouts: &[&str], binding: BindingRef<'_>) -> Self {
        let mut hasher = Sha256::new();
        write_str(&mut hasher, locale);
        write_str(&mut hasher, name);
        write_len(&mut hasher, layouts.len());
        for layout in layouts {
            write_str(&mut hasher, layout);
        }
        write_binding(&mut hasher, binding);

        Self(hex::encode(hasher.finalize()))
    }

    /// Key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Append `part` to a textual key as `<byte length>:<part>`.
pub(crate) fn push_part(key: &mut String, part: &str) {
    // Writing into a String cannot fail
    let _ = write!(key, "{}{KEY_PART_SEPARATOR}{part}", part.len());
}

fn write_len(hasher: &mut Sha256, len: usize) {
    hasher.update((len as u64).to_le_bytes());
}

fn write_str(hasher: &mut Sha256, value: &str) {
    write_len(hasher, value.len());
    hasher.update(value.as_bytes());
}

fn write_binding(hasher: &mut Sha256, binding: BindingRef<'_>) {
    match binding {
        BindingRef::Value(value) => write_value(hasher, value),
        BindingRef::Opaque(type_name) => {
            hasher.update(b"x");
            write_str(hasher, type_name);
        }
    }
}

fn write_number(hasher: &mut Sha256, number: &Number) {
    // 1 and 1.0 render differently, so integer and float stay distinct
    if number.is_f64() {
        hasher.update(b"f");
    } else {
        hasher.update(b"i");
    }
    write_str(hasher, &number.to_string());
}

fn write_value(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Null => hasher.update(b"\x00nil"),
        Value::Bool(flag) => {
            hasher.update(b"b");
            hasher.update([u8::from(*flag)]);
        }
        Value::Number(number) => write_number(hasher, number),
        Value::String(text) => {
            hasher.update(b"s");
            write_str(hasher, text);
        }
        Value::Array(items) => {
            hasher.update(b"a");
            write_len(hasher, items.len());
            for item in items {
                write_value(hasher, item);
            }
        }
        Value::Object(map) => {
            hasher.update(b"o");
            write_len(hasher, map.len());
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            for (key, item) in entries {
                write_str(hasher, key);
                write_value(hasher, item);
            }
        }
    }
}
