//! Engines built from config files.

use anyhow::Result;
use serde_json::json;
use strata::config::{CacheMode, EngineConfig};
use strata::engine::{Engine, RenderContext};
use strata::test_utils::TemplateDirFixture;

#[test]
fn test_engine_from_config_file() -> Result<()> {
    let site = TemplateDirFixture::site()?.with_template("mail/note.txt", "note for {{ name }}")?;
    let config_path = site.write(
        "strata.toml",
        r#"
root = "."
extensions = [".html", ".txt"]
layouts = ["layouts/main"]
cache = "hard"
default_locale = "fr"
"#,
    )?;

    let config = EngineConfig::load_from(&config_path)?;
    assert_eq!(config.cache, CacheMode::Hard);
    assert_eq!(config.root, site.path().join("."));

    let engine = Engine::from_config(config)?;
    assert!(engine.has_template("mail/note"));
    assert!(engine.has_template("pages/home"));
    assert_eq!(engine.cache_mode(), Some(CacheMode::Hard));
    assert_eq!(engine.cache_stats().chains, 1);

    let out = engine.render_to_string(&RenderContext::new(), "mail/note", &json!({"name": "Ada"}), &[])?;
    assert_eq!(out, "note for Ada");
    Ok(())
}

#[test]
fn test_invalid_config_is_reported() -> Result<()> {
    let site = TemplateDirFixture::new()?;
    let path = site.write("strata.toml", "cache = \"sometimes\"")?;

    let err = EngineConfig::load_from(&path).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse engine config"));
    Ok(())
}
