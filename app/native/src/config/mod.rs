//! Configuration module for Window Scatter.
//!
//! This module provides configuration types, loading and saving.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

pub mod template;
pub mod types;

use std::path::PathBuf;
use std::sync::OnceLock;

pub use types::{
    AnimationConfig, BackdropConfig, ConfigError, HotCornerConfig, HotCornerPosition,
    ScatterConfig, config_paths, load_config as load_config_default, load_config_from_path,
    save_config_to_path,
};

/// Global configuration instance, loaded once at startup.
static CONFIG: OnceLock<ScatterConfig> = OnceLock::new();

/// Path to the currently loaded configuration file.
static CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Custom config path override (set via CLI --config flag).
static CUSTOM_CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Sets a custom configuration file path to use instead of the default search paths.
///
/// This must be called before `init()` or `get_config()` to take effect.
///
/// # Returns
///
/// `true` if the path was set successfully, `false` if a path was already set.
pub fn set_custom_config_path(path: PathBuf) -> bool { CUSTOM_CONFIG_PATH.set(path).is_ok() }

/// Loads the configuration from disk.
///
/// Returns the loaded configuration, or a default configuration if loading fails.
/// If no configuration file exists, creates a template configuration file.
fn load_or_default() -> ScatterConfig {
    // Check for custom config path first
    let result = CUSTOM_CONFIG_PATH.get().map_or_else(load_config_default, load_config_from_path);

    match result {
        Ok((config, path)) => {
            tracing::debug!(path = %path.display(), "scatter: loaded configuration");
            let _ = CONFIG_PATH.set(path);
            config
        }
        Err(ConfigError::NotFound) => {
            // Create a template config file at the default location
            create_default_config_file();
            ScatterConfig::default()
        }
        Err(err) => {
            tracing::warn!(error = %err, "scatter: failed to load configuration, using defaults");
            ScatterConfig::default()
        }
    }
}

/// Creates a template configuration file at the default location.
///
/// This is called when no configuration file is found during startup.
fn create_default_config_file() {
    // Get the first (preferred) config path
    let Some(config_path) = config_paths().into_iter().next() else {
        tracing::debug!("scatter: no config path available for creating template");
        return;
    };

    // Only create if it doesn't exist
    if config_path.exists() {
        return;
    }

    match template::create_config_file(&config_path) {
        Ok(()) => {
            let _ = CONFIG_PATH.set(config_path.clone());
            tracing::info!(path = %config_path.display(), "scatter: created default configuration file");
        }
        Err(err) => {
            tracing::debug!(
                error = %err,
                path = %config_path.display(),
                "scatter: failed to create default configuration file"
            );
        }
    }
}

/// Initializes and returns the global configuration instance.
///
/// This function is idempotent - calling it multiple times will return
/// the same configuration instance.
pub fn init() -> &'static ScatterConfig { CONFIG.get_or_init(load_or_default) }

/// Returns the global configuration instance, initializing it if necessary.
pub fn get_config() -> &'static ScatterConfig { CONFIG.get_or_init(load_or_default) }

/// Returns the path to the loaded configuration file, if any.
pub fn get_config_path() -> Option<&'static PathBuf> { CONFIG_PATH.get() }

/// Saves `config` to the loaded configuration file, or to the preferred
/// location if none was loaded.
///
/// The in-memory global configuration is not replaced; changes apply on the
/// next start.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if there is no location to write to, or
/// `ConfigError::IoError` if writing fails.
pub fn save_config(config: &ScatterConfig) -> Result<PathBuf, ConfigError> {
    let path = get_config_path()
        .cloned()
        .or_else(|| CUSTOM_CONFIG_PATH.get().cloned())
        .or_else(|| config_paths().into_iter().next())
        .ok_or(ConfigError::NotFound)?;

    save_config_to_path(config, &path)?;
    tracing::info!(path = %path.display(), "scatter: saved configuration");
    Ok(path)
}
