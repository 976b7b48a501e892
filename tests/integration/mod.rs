//! Integration test suite for strata
//!
//! End-to-end tests against real template directories (created with
//! `strata::test_utils::TemplateDirFixture`) and the `strata` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **render**: pipeline output, layouts, components, errors
//! - **caching**: soft, hard and disabled render caching, layout preloading
//! - **concurrency**: many threads sharing one engine
//! - **config**: engines built from TOML config files
//! - **cli**: the `strata` binary

mod caching;
mod cli;
mod concurrency;
mod config;
mod render;
