//! CLI module for Window Scatter.
//!
//! This module provides the command-line interface: starting the overlay,
//! managing the configuration file, and inspecting hotkeys and layouts
//! without launching the desktop overlay.

mod commands;
mod output;

use clap::Parser;
pub use commands::Cli;

use crate::error::ScatterError;

/// Runs the CLI.
///
/// Parses command-line arguments and executes the appropriate command.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> Result<(), ScatterError> {
    let cli = Cli::parse();
    cli.execute()
}
