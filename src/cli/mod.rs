//! Command-line interface
//!
//! Argument parsing for the four backing-file paths and the interactive
//! command loop that drives the marketplace.

pub mod args;
pub mod repl;

pub use args::CliArgs;
pub use repl::{parse_line, run, Command};

use clap::Parser;

/// Parse command-line arguments
///
/// Prints the usage error and exits with status 1 when the four store-file
/// paths are not supplied; the program never starts with a partial set.
pub fn parse_args() -> CliArgs {
    CliArgs::try_parse().unwrap_or_else(|e| {
        eprintln!("{e}");
        std::process::exit(1);
    })
}
