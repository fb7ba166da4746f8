#![allow(clippy::multiple_crate_versions)]

//! Window Scatter - live thumbnails of every open window.
//!
//! This binary serves as both the desktop overlay and CLI:
//! - When called with no arguments or with `--desktop`: starts the overlay
//! - When called with subcommands (e.g., `scatter config show`): runs CLI commands

fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Run as desktop overlay if:
    // - No arguments (just the binary name)
    // - First arg is --desktop
    let run_desktop = args.len() == 1 || args.get(1).is_some_and(|arg| arg == "--desktop");

    let result = if run_desktop { scatter_lib::run() } else { scatter_lib::cli::run() };

    if let Err(err) = result {
        eprintln!("scatter: {err}");
        std::process::exit(1);
    }
}
