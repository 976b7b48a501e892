//! `strata list`: print registered template names.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::io::Write;

use super::EngineArgs;
use crate::config::EngineConfig;

/// List every template the engine registers, one name per line.
#[derive(Args, Debug)]
pub struct ListCommand {
    /// Also print the base functions available to templates
    #[arg(long)]
    pub functions: bool,

    #[command(flatten)]
    pub engine: EngineArgs,
}

impl ListCommand {
    /// Build the engine and print its template names.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be built or stdout fails.
    pub fn execute(self, config: EngineConfig) -> Result<()> {
        let engine = self.engine.build_engine(config)?;

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for name in engine.template_names() {
            writeln!(out, "{name}")?;
        }

        if self.functions {
            writeln!(out)?;
            writeln!(out, "{}", "Functions:".bold())?;
            for name in engine.function_names() {
                writeln!(out, "  {name}")?;
            }
        }

        Ok(())
    }
}
