//! Render cache and layout chain cache behavior.

use anyhow::Result;
use serde_json::json;
use strata::config::CacheMode;
use strata::engine::RenderContext;
use strata::test_utils::TemplateDirFixture;

const LAYOUTS: &[&str] = &["layouts/main", "layouts/root"];

#[test]
fn test_soft_cache_identical_inputs_identical_output() -> Result<()> {
    let site = TemplateDirFixture::site()?;
    let engine = site.engine()?;
    let ctx = RenderContext::new();

    let first = engine.render_to_string(&ctx, "pages/home", &json!({"name": "Ada"}), LAYOUTS)?;
    let second = engine.render_to_string(&ctx, "pages/home", &json!({"name": "Ada"}), LAYOUTS)?;

    assert_eq!(first, second);
    let stats = engine.cache_stats().renders;
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);
    Ok(())
}

#[test]
fn test_soft_cache_never_serves_another_binding() -> Result<()> {
    let site = TemplateDirFixture::site()?;
    let engine = site.engine()?;
    let ctx = RenderContext::new();

    let a = engine.render_to_string(&ctx, "pages/home", &json!({"name": "A"}), LAYOUTS)?;
    let b = engine.render_to_string(&ctx, "pages/home", &json!({"name": "B"}), LAYOUTS)?;

    assert!(a.contains("welcome, A"));
    assert!(b.contains("welcome, B"));
    assert_eq!(engine.cache_stats().renders.entries, 2);
    Ok(())
}

#[test]
fn test_soft_cache_key_ignores_field_order() -> Result<()> {
    let site = TemplateDirFixture::site()?;
    let engine = site.engine()?;
    let ctx = RenderContext::new();

    engine.render_to_string(&ctx, "pages/home", &json!({"name": "A", "extra": 1}), &[])?;
    engine.render_to_string(&ctx, "pages/home", &json!({"extra": 1, "name": "A"}), &[])?;

    assert_eq!(engine.cache_stats().renders.hits, 1);
    Ok(())
}

#[test]
fn test_hard_cache_ignores_binding() -> Result<()> {
    let site = TemplateDirFixture::site()?;
    let engine = site.builder().hard_cache(true).build()?;
    let ctx = RenderContext::new();

    let a = engine.render_to_string(&ctx, "pages/home", &json!({"name": "A"}), LAYOUTS)?;
    let b = engine.render_to_string(&ctx, "pages/home", &json!({"name": "B"}), LAYOUTS)?;
    assert_eq!(a, b);

    // Layouts and locale are still part of the key
    let bare = engine.render_to_string(&ctx, "pages/home", &json!({"name": "B"}), &[])?;
    assert_eq!(bare, "<h1>welcome, B</h1>");
    let german = engine.render_to_string(&ctx.clone().with_locale("de"), "pages/home", &json!({"name": "C"}), LAYOUTS)?;
    assert!(german.contains("welcome, C"));
    Ok(())
}

#[test]
fn test_disabled_cache_always_renders() -> Result<()> {
    let site = TemplateDirFixture::site()?;
    let engine = site.builder().cache_mode(CacheMode::Disabled).build()?;
    let ctx = RenderContext::new();

    for name in ["A", "B", "A"] {
        let out = engine.render_to_string(&ctx, "pages/home", &json!({"name": name}), &[])?;
        assert_eq!(out, format!("<h1>welcome, {name}</h1>"));
    }

    let stats = engine.cache_stats().renders;
    assert_eq!((stats.hits, stats.misses, stats.entries), (0, 0, 0));
    Ok(())
}

#[test]
fn test_cached_output_survives_template_changes_on_disk() -> Result<()> {
    let site = TemplateDirFixture::site()?;
    let engine = site.engine()?;
    let ctx = RenderContext::new();

    let before = engine.render_to_string(&ctx, "pages/about", &(), &[])?;
    site.write("pages/about.html", "changed")?;
    let after = engine.render_to_string(&ctx, "pages/about", &(), &[])?;

    // Templates are compiled once; the directory is not watched.
    assert_eq!(before, after);
    Ok(())
}

#[test]
fn test_failed_render_is_not_cached() -> Result<()> {
    let site = TemplateDirFixture::site()?;
    let engine = site.engine()?;
    let ctx = RenderContext::new();

    // `name` is missing from the binding, so the page fails to execute
    assert!(engine.render_to_string(&ctx, "pages/home", &json!({}), &[]).is_err());
    assert_eq!(engine.cache_stats().renders.entries, 0);

    let out = engine.render_to_string(&ctx, "pages/home", &json!({"name": "Ada"}), &[])?;
    assert_eq!(out, "<h1>welcome, Ada</h1>");
    Ok(())
}

#[test]
fn test_common_layouts_are_preloaded() -> Result<()> {
    let site = TemplateDirFixture::site()?;
    let engine = site.builder().layouts(["layouts/main", "layouts/root", "layouts/absent"]).build()?;

    assert_eq!(engine.cache_stats().chains, 2);

    engine.render_to_string(&RenderContext::new(), "pages/about", &(), &["layouts/main"])?;
    assert_eq!(engine.cache_stats().chains, 2);

    engine.render_to_string(&RenderContext::new(), "pages/about", &(), LAYOUTS)?;
    assert_eq!(engine.cache_stats().chains, 3);
    Ok(())
}

#[test]
fn test_engines_do_not_share_caches() -> Result<()> {
    let site = TemplateDirFixture::site()?;
    let first = site.engine()?;
    let second = site.engine()?;

    first.render_to_string(&RenderContext::new(), "pages/about", &(), &[])?;
    assert_eq!(first.cache_stats().renders.entries, 1);
    assert_eq!(second.cache_stats().renders.entries, 0);

    // Clones share everything
    let clone = first.clone();
    assert_eq!(clone.cache_stats().renders.entries, 1);
    Ok(())
}
