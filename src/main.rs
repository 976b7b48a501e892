//! The `strata` binary.
//!
//! All command logic lives in [`strata::cli`]; this file only maps a failed
//! command to a coloured message on stderr and exit status 1.

use clap::Parser;
use std::process::ExitCode;
use strata::cli::Cli;
use strata::core::user_friendly_error;

fn main() -> ExitCode {
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let Err(err) = Cli::parse().execute() else {
        return ExitCode::SUCCESS;
    };
    user_friendly_error(err).display();
    ExitCode::FAILURE
}
