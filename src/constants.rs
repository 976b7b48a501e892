//! Constants shared across the strata codebase.
//!
//! Function names exposed to templates, defaults for the engine configuration
//! and limits for the buffer pool live here so that templates, tests and the
//! CLI agree on a single spelling.

/// Name of the per-call translation function (`{{ T(key="greeting") }}`).
pub const TRANSLATE_FN: &str = "T";

/// Name of the per-call context value accessor (`{{ ctx_val(key="user") }}`).
pub const CONTEXT_VALUE_FN: &str = "ctx_val";

/// Name of the zero-argument function a layout calls to insert wrapped content.
pub const EMBED_FN: &str = "embed";

/// Name of the function that renders another template with its own props.
pub const COMPONENT_FN: &str = "component";

/// Function names whose implementation is rebound for every template execution.
///
/// The second element tells the backend whether the function output is trusted
/// markup that must bypass autoescaping.
pub const SCOPED_FUNCTIONS: &[(&str, bool)] =
    &[(TRANSLATE_FN, false), (CONTEXT_VALUE_FN, false), (EMBED_FN, true), (COMPONENT_FN, true)];

/// Context variable holding a binding that is not a JSON object.
///
/// Object bindings expose their fields at the top level of the template
/// context; anything else (strings, numbers, arrays) is reachable as `value`.
pub const BINDING_VALUE_KEY: &str = "value";

/// Locale used when the render context does not carry one.
pub const DEFAULT_LOCALE: &str = "en";

/// File extension recognised when none is configured.
pub const DEFAULT_EXTENSION: &str = ".html";

/// Separator between a key part's byte length and its text in textual cache keys.
pub const KEY_PART_SEPARATOR: char = ':';

/// Maximum nesting depth for `component` calls.
///
/// Components may render components; this bound stops a template that
/// includes itself from recursing until the stack overflows.
pub const MAX_COMPONENT_DEPTH: usize = 10;

/// Number of idle buffers the pool keeps around by default.
pub const DEFAULT_POOL_MAX_RETAINED: usize = 64;

/// Buffers that grew beyond this capacity (bytes) are dropped instead of pooled.
pub const DEFAULT_POOL_MAX_BUFFER_CAPACITY: usize = 1024 * 1024;

/// Initial capacity of freshly allocated render buffers.
pub const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;

/// Environment variable overriding the configuration file used by the CLI.
pub const CONFIG_PATH_ENV: &str = "STRATA_CONFIG";
