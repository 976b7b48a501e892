//! Error types for strata.
//!
//! The error system follows the lifecycle of an engine:
//! - [`InitError`] covers everything that can go wrong while building an engine
//!   (missing directory, unreadable files, templates that fail to compile). An
//!   engine that failed to build does not exist, so these are always fatal.
//! - [`RenderError`] covers a single render call. Lookup misses, execution
//!   failures and sink write failures affect only that call; the engine and its
//!   caches are left untouched.
//!
//! Cache key construction has no error type on purpose: every binding can be
//! keyed, see [`crate::cache::key`].
//!
//! For the command line, [`user_friendly_error`] turns any error into an
//! [`ErrorContext`] with a coloured message and, where possible, a suggestion.
//!
//! # Examples
//!
//! ```rust,no_run
//! use strata::core::RenderError;
//! use strata::engine::{Engine, RenderContext};
//!
//! let engine = Engine::default();
//! let err = engine
//!     .render_to_string(&RenderContext::default(), "home", &(), &[])
//!     .unwrap_err();
//! assert!(matches!(err, RenderError::NotInitialized));
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error used at collaborator seams (template backends, sources, functions).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while constructing an [`Engine`](crate::engine::Engine).
#[derive(Error, Debug)]
pub enum InitError {
    /// The configured template root is empty.
    #[error("No template directory provided")]
    NoTemplateDirectory,

    /// The configured template root does not exist on disk.
    #[error("Template directory does not exist: {}", .path.display())]
    TemplateDirectoryMissing {
        /// Path that was checked
        path: PathBuf,
    },

    /// Walking the template root or reading one of its files failed.
    #[error("Failed to read templates from {}", .path.display())]
    SourceRead {
        /// File or directory that could not be read
        path: PathBuf,
        /// Underlying I/O or walk error
        #[source]
        source: BoxError,
    },

    /// The source produced no templates at all.
    #[error("No templates parsed from {origin}")]
    NoTemplatesParsed {
        /// Human readable description of the template source
        origin: String,
    },

    /// At least one template failed to compile.
    #[error("Template parsing failed: {message}")]
    TemplateParsingFailed {
        /// Flattened backend error chain
        message: String,
        /// Backend error
        #[source]
        source: BoxError,
    },
}

/// A layout name that does not resolve to a registered template.
///
/// Returned by the chain resolver; chain resolution is atomic, so when this
/// error is produced nothing was cached for the requested layout list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Layout not found: {name}")]
pub struct LayoutNotFound {
    /// The first layout name in the list that did not resolve
    pub name: String,
}

/// Which part of the pipeline was executing when a template failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    /// The requested content template
    Base,
    /// A layout wrapper, by position in the requested layout list
    Layout {
        /// Zero-based position of the layout
        index: usize,
    },
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderStage::Base => write!(f, "base template"),
            RenderStage::Layout {
                index,
            } => write!(f, "layout #{index}"),
        }
    }
}

/// Errors raised by a single render call.
///
/// A render that returns any of these has written nothing to its output sink,
/// with the exception of [`RenderError::Io`] where the sink itself failed
/// part-way through the final write.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The engine handle was never built (for example `Engine::default()`).
    #[error("Template engine not initialized")]
    NotInitialized,

    /// The requested content template is not registered.
    #[error("Template not found: {name}")]
    TemplateNotFound {
        /// Requested template name
        name: String,
    },

    /// One of the requested layouts is not registered.
    #[error(transparent)]
    LayoutNotFound(#[from] LayoutNotFound),

    /// The binding could not be turned into a template context.
    #[error("Binding for '{template}' cannot be converted to a template context")]
    Binding {
        /// Template being rendered
        template: String,
        /// Serialization error
        #[source]
        source: serde_json::Error,
    },

    /// A template failed while executing.
    #[error("Template execution failed in {stage} '{template}': {message}")]
    Execution {
        /// Name of the template that failed
        template: String,
        /// Base template or layout position
        stage: RenderStage,
        /// Flattened error chain from the backend
        message: String,
        /// Backend error
        #[source]
        source: BoxError,
    },

    /// Writing the rendered bytes to the output sink failed.
    #[error("Failed to write rendered output")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Whether the error is a lookup miss (content template or layout).
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, RenderError::TemplateNotFound { .. } | RenderError::LayoutNotFound(_))
    }

    pub(crate) fn execution(template: &str, stage: RenderStage, source: BoxError) -> Self {
        RenderError::Execution {
            template: template.to_string(),
            stage,
            message: format_error_chain(source.as_ref()),
            source,
        }
    }
}

/// Flatten an error and all of its sources into one line.
///
/// Tera reports the interesting part of a failure (the missing variable, the
/// failing function) in the error's source chain, while the top-level message
/// only says which template failed. Duplicate messages are collapsed.
pub fn format_error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut messages: Vec<String> = Vec::new();
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(error);

    while let Some(err) = current {
        let message = err.to_string().trim().to_string();
        if !message.is_empty() && !messages.contains(&message) {
            messages.push(message);
        }
        current = err.source();
    }

    messages.join(" → ")
}

/// An error decorated with an optional suggestion for CLI display.
///
/// Built by [`user_friendly_error`] in the binary. Library callers get the
/// typed [`InitError`] and [`RenderError`] values instead and never need this.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: anyhow::Error,
    /// Optional hint for resolving the error
    pub suggestion: Option<String>,
}

impl ErrorContext {
    /// Wrap an error without a suggestion.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use strata::core::{ErrorContext, RenderError};
    ///
    /// let context = ErrorContext::new(RenderError::NotInitialized.into());
    /// assert!(context.suggestion.is_none());
    /// ```
    #[must_use]
    pub const fn new(error: anyhow::Error) -> Self {
        Self {
            error,
            suggestion: None,
        }
    }

    /// Attach a suggestion.
    ///
    /// Suggestions name a concrete next step: a flag to pass, a command to run.
    /// [`display`](Self::display) prints them in green under the error.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use strata::core::ErrorContext;
    ///
    /// let context = ErrorContext::new(anyhow::anyhow!("no templates"))
    ///     .with_suggestion("Pass --ext .txt for plain text templates");
    /// assert_eq!(context.to_string(), "no templates\nSuggestion: Pass --ext .txt for plain text templates");
    /// ```
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Print the error to stderr with colours.
    ///
    /// The error and its whole `anyhow` context chain go on one red line, the
    /// suggestion (if any) on a green line after it. Colour is dropped when
    /// stderr is not a terminal.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use strata::core::ErrorContext;
    ///
    /// ErrorContext::new(anyhow::anyhow!("render failed"))
    ///     .with_suggestion("Run `strata list`")
    ///     .display();
    /// ```
    pub fn display(&self) {
        eprintln!("{}: {:#}", "error".red().bold(), self.error);

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.error)?;

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Convert any error into an [`ErrorContext`] with a suggestion where one is known.
///
/// The error is downcast to [`InitError`] or [`RenderError`] through any
/// `anyhow` context wrapping it. Missing directories point at `--dir`, unknown
/// template or layout names point at `strata list`. Other errors pass through
/// without a suggestion.
///
/// # Examples
///
/// ```rust,no_run
/// use strata::core::{RenderError, user_friendly_error};
///
/// let err = anyhow::Error::new(RenderError::TemplateNotFound {
///     name: "pages/home".into(),
/// });
/// let context = user_friendly_error(err.context("Failed to render 'pages/home'"));
/// assert!(context.suggestion.is_some());
/// context.display();
/// ```
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let suggestion = if let Some(init) = error.downcast_ref::<InitError>() {
        match init {
            InitError::NoTemplateDirectory | InitError::TemplateDirectoryMissing { .. } => {
                Some("Pass an existing directory with --dir or set `root` in the config file")
            }
            InitError::NoTemplatesParsed { .. } => {
                Some("Check that the template files use one of the configured extensions (--ext)")
            }
            InitError::TemplateParsingFailed { .. } => {
                Some("Fix the template syntax reported above; every template must compile")
            }
            InitError::SourceRead { .. } => Some("Check file permissions under the template root"),
        }
    } else if let Some(render) = error.downcast_ref::<RenderError>() {
        match render {
            RenderError::TemplateNotFound { .. } | RenderError::LayoutNotFound(_) => {
                Some("Run `strata list` to see the registered template names")
            }
            RenderError::Binding { .. } => Some("Binding data must serialize to JSON"),
            _ => None,
        }
    } else {
        None
    };

    let context = ErrorContext::new(error);
    match suggestion {
        Some(suggestion) => context.with_suggestion(suggestion),
        None => context,
    }
}
