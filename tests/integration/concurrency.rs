//! Many threads rendering through one engine.

use anyhow::Result;
use serde_json::{Value, json};
use std::thread;
use strata::engine::{Engine, RenderContext};
use strata::templating::Translator;
use strata::test_utils::TemplateDirFixture;

const THREADS: usize = 8;
const ROUNDS: usize = 50;

struct Tagged(usize);

impl Translator for Tagged {
    fn translate(&self, _locale: &str, key: &str, _args: &[Value]) -> String {
        format!("{key}#{}", self.0)
    }
}

fn expected(thread: usize, round: usize) -> String {
    format!("<html><main><h1>welcome, user-{thread}-{round}</h1></main></html>")
}

#[test]
fn test_concurrent_renders_are_isolated() -> Result<()> {
    let site = TemplateDirFixture::site()?;
    let engine = site.engine()?;

    thread::scope(|scope| {
        for t in 0..THREADS {
            let engine = &engine;
            scope.spawn(move || {
                let ctx = RenderContext::new();
                for round in 0..ROUNDS {
                    // Every other round repeats a binding to mix cache hits in
                    let round = round - round % 2;
                    let binding = json!({"name": format!("user-{t}-{round}")});
                    let out = engine
                        .render_to_string(&ctx, "pages/home", &binding, &["layouts/main", "layouts/root"])
                        .unwrap();
                    assert_eq!(out, expected(t, round));
                }
            });
        }
    });

    let stats = engine.cache_stats().renders;
    assert_eq!(stats.entries, THREADS * ROUNDS / 2);
    assert_eq!(stats.hits + stats.misses, (THREADS * ROUNDS) as u64);
    Ok(())
}

#[test]
fn test_concurrent_embed_and_translators_do_not_leak() -> Result<()> {
    let site = TemplateDirFixture::site()?;
    let engine = site.builder().cache_mode(strata::CacheMode::Disabled).build()?;

    thread::scope(|scope| {
        for t in 0..THREADS {
            let engine: &Engine = &engine;
            scope.spawn(move || {
                let ctx = RenderContext::new().with_translator(Tagged(t));
                for round in 0..ROUNDS {
                    let binding = json!({"name": round});
                    let out = engine.render_to_string(&ctx, "pages/home", &binding, &["layouts/main"]).unwrap();
                    assert_eq!(out, format!("<main><h1>welcome#{t}, {round}</h1></main>"));
                }
            });
        }
    });
    Ok(())
}

#[test]
fn test_engine_clones_move_across_threads() -> Result<()> {
    let site = TemplateDirFixture::site()?;
    let engine = site.engine()?;

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let engine = engine.clone();
            thread::spawn(move || {
                engine
                    .render_to_string(&RenderContext::new(), "partials/item", &json!({"label": t}), &[])
                    .unwrap()
            })
        })
        .collect();

    for (t, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), format!("<li>{t}</li>"));
    }
    assert_eq!(engine.cache_stats().renders.entries, THREADS);
    Ok(())
}
