//! Window Scatter - live thumbnails of every open window, scattered over a
//! blurred desktop.
//!
//! This library provides both the desktop overlay and CLI functionality.
//! The overlay is summoned by a global hotkey or a hot corner, shows every
//! visible window as a live thumbnail, and animates the chosen window back
//! into place.

// Core modules
pub mod cli;
pub mod config;
pub mod error;
pub mod schema;

// Overlay modules
pub mod backdrop;
pub mod hot_corner;
pub mod hotkey;
pub mod platform;
pub mod scatter;

use tracing_subscriber::EnvFilter;

use crate::error::ScatterError;

/// Environment variable holding the log filter, e.g. `scatter_lib=debug`.
pub const LOG_ENV: &str = "SCATTER_LOG";

/// Installs the global `tracing` subscriber.
///
/// The filter is read from [`LOG_ENV`] and defaults to `info` for this crate.
/// Calling it again after a subscriber is installed has no effect.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("scatter_lib=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}

/// Runs the desktop overlay until it is shut down.
///
/// This initializes logging and configuration, then hands over to the
/// platform message loop.
///
/// # Errors
///
/// Returns an error if the overlay cannot be created, or
/// [`ScatterError::UnsupportedPlatform`] when not running on Windows.
pub fn run() -> Result<(), ScatterError> {
    init_tracing();

    // Initialize the configuration system early
    let config = config::init();
    tracing::info!(hotkey = %config.hotkey_spec(), "scatter: starting overlay");

    #[cfg(windows)]
    {
        platform::windows::run_desktop(config)
    }

    #[cfg(not(windows))]
    {
        Err(ScatterError::UnsupportedPlatform)
    }
}
