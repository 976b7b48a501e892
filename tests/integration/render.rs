//! Render pipeline behavior against a template directory.

use anyhow::Result;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use strata::core::{RenderError, RenderStage};
use strata::engine::{Engine, Props, RenderContext};
use strata::templating::Translator;
use strata::test_utils::{TemplateDirFixture, init_test_logging};

#[derive(Serialize)]
struct Home {
    name: String,
}

struct Catalog;

impl Translator for Catalog {
    fn translate(&self, locale: &str, key: &str, args: &[Value]) -> String {
        match (locale, key) {
            ("fr", "welcome") => "Bienvenue".to_string(),
            ("en", "welcome") => "Welcome".to_string(),
            (_, "items") => format!("{} items", args.first().and_then(Value::as_i64).unwrap_or(0)),
            _ => key.to_string(),
        }
    }
}

#[test]
fn test_no_layouts_equals_base_output() -> Result<()> {
    init_test_logging(None);
    let site = TemplateDirFixture::site()?;
    let engine = site.engine()?;

    let out = engine.render_to_string(&RenderContext::new(), "pages/home", &json!({"name": "Ada"}), &[])?;
    assert_eq!(out, "<h1>welcome, Ada</h1>");
    Ok(())
}

#[test]
fn test_layouts_wrap_innermost_first() -> Result<()> {
    let site = TemplateDirFixture::site()?;
    let engine = site.engine()?;
    let ctx = RenderContext::new();
    let binding = Home {
        name: "Ada".to_string(),
    };

    let nested = engine.render_to_string(&ctx, "pages/home", &binding, &["layouts/main", "layouts/root"])?;
    assert_eq!(nested, "<html><main><h1>welcome, Ada</h1></main></html>");

    let swapped = engine.render_to_string(&ctx, "pages/home", &binding, &["layouts/root", "layouts/main"])?;
    assert_eq!(swapped, "<main><html><h1>welcome, Ada</h1></html></main>");
    assert_ne!(nested, swapped);
    Ok(())
}

#[test]
fn test_layouts_see_the_same_binding() -> Result<()> {
    let site = TemplateDirFixture::site()?
        .with_template("layouts/titled.html", "<title>{{ name }}</title>{{ embed() }}")?;
    let engine = site.engine()?;

    let out = engine.render_to_string(
        &RenderContext::new(),
        "pages/home",
        &json!({"name": "Ada"}),
        &["layouts/titled"],
    )?;
    assert_eq!(out, "<title>Ada</title><h1>welcome, Ada</h1>");
    Ok(())
}

#[test]
fn test_missing_template_writes_nothing() -> Result<()> {
    let site = TemplateDirFixture::site()?;
    let engine = site.engine()?;
    let mut out = Vec::new();

    let err = engine
        .render(&RenderContext::new(), &mut out, "pages/missing", &(), &["layouts/main"])
        .unwrap_err();

    assert!(matches!(err, RenderError::TemplateNotFound { ref name } if name == "pages/missing"));
    assert!(out.is_empty());
    Ok(())
}

#[test]
fn test_missing_layout_writes_nothing() -> Result<()> {
    let site = TemplateDirFixture::site()?;
    let engine = site.engine()?;
    let mut out = Vec::new();

    let err = engine
        .render(
            &RenderContext::new(),
            &mut out,
            "pages/home",
            &json!({"name": "Ada"}),
            &["layouts/main", "layouts/ghost"],
        )
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(err.to_string().contains("layouts/ghost"));
    assert!(out.is_empty());
    assert_eq!(engine.cache_stats().chains, 0);
    Ok(())
}

#[test]
fn test_base_failure_names_template_and_stage() -> Result<()> {
    let site = TemplateDirFixture::site()?.with_template("pages/broken.html", "{{ nope.deeper }}")?;
    let engine = site.engine()?;
    let mut out = Vec::new();

    let err = engine.render(&RenderContext::new(), &mut out, "pages/broken", &(), &[]).unwrap_err();
    match &err {
        RenderError::Execution {
            template,
            stage,
            ..
        } => {
            assert_eq!(template, "pages/broken");
            assert_eq!(*stage, RenderStage::Base);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(out.is_empty());
    Ok(())
}

#[test]
fn test_translator_and_context_values() -> Result<()> {
    let site = TemplateDirFixture::site()?
        .with_template("pages/count.html", "{{ T(key=\"items\", args=[n]) }}")?;
    let engine = site.engine()?;

    let fr = RenderContext::new().with_locale("fr").with_translator(Catalog);
    let out = engine.render_to_string(&fr, "pages/home", &json!({"name": "Ada"}), &[])?;
    assert_eq!(out, "<h1>Bienvenue, Ada</h1>");

    // Default locale of the engine is "en"
    let en = RenderContext::new().with_translator(Catalog);
    let out = engine.render_to_string(&en, "pages/home", &json!({"name": "Ada"}), &[])?;
    assert_eq!(out, "<h1>Welcome, Ada</h1>");

    let out = engine.render_to_string(&en, "pages/count", &json!({"n": 3}), &[])?;
    assert_eq!(out, "3 items");

    let ctx = RenderContext::new().with_value("site", "strata");
    let out = engine.render_to_string(&ctx, "pages/about", &(), &[])?;
    assert_eq!(out, "<p>About strata</p>");
    Ok(())
}

#[test]
fn test_context_functions_reach_layouts_and_components() -> Result<()> {
    let site = TemplateDirFixture::site()?
        .with_template("partials/user.html", "<b>{{ ctx_val(key=\"user\") }}</b>")?
        .with_template("pages/profile.html", "{{ component(name=\"partials/user\") }}")?
        .with_template("layouts/greeting.html", "{{ T(key=\"welcome\") }}:{{ embed() }}")?;
    let engine = site.engine()?;

    let ctx = RenderContext::new().with_locale("fr").with_translator(Catalog).with_value("user", "ada");
    let out = engine.render_to_string(&ctx, "pages/profile", &(), &["layouts/greeting"])?;
    assert_eq!(out, "Bienvenue:<b>ada</b>");
    Ok(())
}

#[test]
fn test_components_render_inline() -> Result<()> {
    let site = TemplateDirFixture::site()?;
    let engine = site.engine()?;

    let out = engine.render_to_string(&RenderContext::new(), "pages/list", &json!({"items": ["a", "b"]}), &[])?;
    assert_eq!(out, "<li>a</li><li>b</li>");
    Ok(())
}

#[test]
fn test_props_as_binding() -> Result<()> {
    let site = TemplateDirFixture::site()?.with_template("partials/card.html", "{{ title }}|{{ size }}")?;
    let engine = site.engine()?;

    let defaults = Props::new().with("size", "md").with("title", "untitled");
    let props = Props::merge([defaults, Props::new().with("title", "Hello")]);

    let out = engine.render_to_string(&RenderContext::new(), "partials/card", &props, &[])?;
    assert_eq!(out, "Hello|md");
    Ok(())
}

#[test]
fn test_embedded_content_is_not_escaped_but_data_is() -> Result<()> {
    let site = TemplateDirFixture::site()?;
    let engine = site.engine()?;

    let out = engine.render_to_string(
        &RenderContext::new(),
        "pages/home",
        &json!({"name": "<script>"}),
        &["layouts/main"],
    )?;
    assert_eq!(out, "<main><h1>welcome, &lt;script&gt;</h1></main>");
    Ok(())
}

#[test]
fn test_autoescape_can_be_disabled() -> Result<()> {
    let site = TemplateDirFixture::site()?;
    let engine = site.builder().autoescape(false).build()?;

    let out = engine.render_to_string(&RenderContext::new(), "pages/home", &json!({"name": "<b>"}), &[])?;
    assert_eq!(out, "<h1>welcome, <b></h1>");
    Ok(())
}

#[test]
fn test_scalar_binding_is_value() -> Result<()> {
    let site = TemplateDirFixture::new()?.with_template("echo.html", "[{{ value }}]")?;
    let engine = site.engine()?;

    assert_eq!(engine.render_to_string(&RenderContext::new(), "echo", "hi", &[])?, "[hi]");
    assert_eq!(engine.render_to_string(&RenderContext::new(), "echo", &42, &[])?, "[42]");
    Ok(())
}

#[test]
fn test_unserializable_binding_is_an_error() -> Result<()> {
    let site = TemplateDirFixture::new()?.with_template("page.html", "x")?;
    let engine = site.engine()?;

    // JSON object keys must be strings
    let binding: BTreeMap<(u8, u8), u8> = BTreeMap::from([((1, 2), 3)]);
    let mut out = Vec::new();
    let err = engine.render(&RenderContext::new(), &mut out, "page", &binding, &[]).unwrap_err();

    assert!(matches!(err, RenderError::Binding { .. }));
    assert!(out.is_empty());
    Ok(())
}

#[test]
fn test_multiple_extensions() -> Result<()> {
    let site = TemplateDirFixture::new()?
        .with_template("mail/welcome.txt", "Hi {{ name }}")?
        .with_template("mail/layout.html", "<div>{{ embed() }}</div>")?
        .with_template("notes.md", "ignored")?;
    let engine = site.builder().extensions([".html", "txt"]).build()?;

    assert_eq!(engine.template_names(), vec!["mail/layout", "mail/welcome"]);
    let out = engine.render_to_string(&RenderContext::new(), "mail/welcome", &json!({"name": "Ada"}), &["mail/layout"])?;
    assert_eq!(out, "<div>Hi Ada</div>");
    Ok(())
}

#[test]
fn test_safe_markup_output() -> Result<()> {
    let site = TemplateDirFixture::site()?;
    let engine = site.engine()?;

    let markup = engine.render_to_safe_markup(&RenderContext::new(), "partials/item", &json!({"label": "x"}), &[])?;
    assert_eq!(markup.to_string(), "<li>x</li>");
    assert_eq!(serde_json::to_value(&markup)?, json!("<li>x</li>"));
    Ok(())
}

#[test]
fn test_uninitialized_engine_never_panics() {
    let engine = Engine::default();
    let mut out = Vec::new();

    let err = engine.render(&RenderContext::new(), &mut out, "anything", &(), &["layout"]).unwrap_err();
    assert!(matches!(err, RenderError::NotInitialized));
    assert!(out.is_empty());
    assert!(engine.render_to_string(&RenderContext::new(), "anything", &(), &[]).is_err());
}

#[test]
fn test_template_inheritance_between_files() -> Result<()> {
    let site = TemplateDirFixture::new()?
        .with_template("base.html", "<{% block body %}{% endblock body %}>")?
        .with_template("child.html", "{% extends \"base\" %}{% block body %}child{% endblock body %}")?;
    let engine = site.engine()?;

    assert_eq!(engine.render_to_string(&RenderContext::new(), "child", &(), &[])?, "<child>");
    Ok(())
}
