//! Core types shared by every strata module.
//!
//! Currently this is the error taxonomy; see [`error`] for details.

pub mod error;

pub use error::{
    BoxError, ErrorContext, InitError, LayoutNotFound, RenderError, RenderStage,
    format_error_chain, user_friendly_error,
};
