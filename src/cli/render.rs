//! `strata render`: render one template to stdout.

use anyhow::{Context, Result, bail};
use clap::Args;
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;

use super::EngineArgs;
use crate::config::EngineConfig;
use crate::engine::RenderContext;

/// Render a template, optionally wrapped in layouts.
#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Logical template name (path under the root without extension)
    pub name: String,

    /// Layout to wrap the output in; repeat to nest, innermost first
    #[arg(short = 'l', long = "layout", value_name = "LAYOUT")]
    pub layouts: Vec<String>,

    /// JSON file with the template data
    #[arg(long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Locale passed to `T(...)`
    #[arg(long)]
    pub locale: Option<String>,

    /// Request value readable with `ctx_val`, as KEY=VALUE; repeatable
    #[arg(long = "value", value_name = "KEY=VALUE")]
    pub values: Vec<String>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

impl RenderCommand {
    /// Build the engine and render to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if the data file is unreadable, a value is malformed,
    /// or the engine fails to build or render.
    pub fn execute(self, config: EngineConfig) -> Result<()> {
        let binding = self.load_data()?;
        let ctx = self.context()?;
        let engine = self.engine.build_engine(config)?;
        let layouts: Vec<&str> = self.layouts.iter().map(String::as_str).collect();

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        engine
            .render(&ctx, &mut out, &self.name, &binding, &layouts)
            .with_context(|| format!("Failed to render '{}'", self.name))?;
        out.flush()?;
        Ok(())
    }

    fn load_data(&self) -> Result<Value> {
        let Some(path) = &self.data else {
            return Ok(Value::Null);
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read data file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse data file {} as JSON", path.display()))
    }

    fn context(&self) -> Result<RenderContext> {
        let mut ctx = RenderContext::new();
        if let Some(locale) = &self.locale {
            ctx = ctx.with_locale(locale.clone());
        }
        for pair in &self.values {
            let Some((key, value)) = pair.split_once('=') else {
                bail!("Invalid --value '{pair}': expected KEY=VALUE");
            };
            ctx = ctx.with_value(key.trim(), value);
        }
        Ok(ctx)
    }
}
