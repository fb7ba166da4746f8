//! Configuration types for Window Scatter.
//!
//! This module provides the configuration types and loading functionality.
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hotkey::{DEFAULT_HOTKEY, HotkeySpec};
use crate::scatter::animation::clamp_duration;
use crate::scatter::window::DEFAULT_MAX_WINDOWS;

/// Screen corner watched by the hot corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum HotCornerPosition {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Hot corner configuration.
///
/// Moving the cursor into the configured corner and keeping it there for
/// `delay` milliseconds shows the overlay, like pressing the hotkey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct HotCornerConfig {
    /// Whether the hot corner is active.
    /// Default: false
    pub enabled: bool,

    /// Which corner to watch.
    /// Default: "topLeft"
    pub position: HotCornerPosition,

    /// Dwell time in milliseconds before the overlay is shown.
    /// Default: 500
    pub delay: u64,
}

impl Default for HotCornerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            position: HotCornerPosition::TopLeft,
            delay: 500,
        }
    }
}

impl HotCornerConfig {
    /// Returns whether the hot corner is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool { self.enabled }

    /// Dwell time as a [`Duration`].
    #[must_use]
    pub const fn delay(&self) -> Duration { Duration::from_millis(self.delay) }
}

/// Animation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimationConfig {
    /// Duration of the scatter and return animations in milliseconds.
    /// Values are clamped to 50..=1000.
    /// Default: 250
    pub duration: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self { Self { duration: 250 } }
}

impl AnimationConfig {
    /// Clamped animation duration.
    #[must_use]
    pub fn duration(&self) -> Duration { clamp_duration(Duration::from_millis(self.duration)) }
}

/// Backdrop configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct BackdropConfig {
    /// Blur radius in pixels of the wallpaper behind the thumbnails once the
    /// overlay is fully shown (0 = no blur).
    /// Default: 40
    pub blur: u32,
}

impl Default for BackdropConfig {
    fn default() -> Self { Self { blur: 40 } }
}

/// Root configuration structure for Window Scatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ScatterConfig {
    /// JSON schema reference for editor support.
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Keyboard chord that shows the overlay, e.g. "Win+W" or "Ctrl+Alt+Tab".
    /// Modifiers: ctrl, alt, shift, win. Keys: A-Z, 0-9, F1-F12, tab, enter,
    /// space, esc, backspace, delete, insert, home, end, pageup, pagedown and
    /// the arrow keys.
    /// Default: "Win+W"
    pub hotkey: String,

    /// Hot corner configuration.
    pub hot_corner: HotCornerConfig,

    /// Animation configuration.
    pub animation: AnimationConfig,

    /// Backdrop configuration.
    pub backdrop: BackdropConfig,

    /// Maximum number of windows shown at once.
    /// Default: 20
    pub max_windows: usize,

    /// Additional window titles to ignore (case-insensitive substring match).
    pub excluded_titles: Vec<String>,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            schema: None,
            hotkey: DEFAULT_HOTKEY.to_string(),
            hot_corner: HotCornerConfig::default(),
            animation: AnimationConfig::default(),
            backdrop: BackdropConfig::default(),
            max_windows: DEFAULT_MAX_WINDOWS,
            excluded_titles: Vec::new(),
        }
    }
}

impl ScatterConfig {
    /// The configured chord, or the default one if it does not parse.
    #[must_use]
    pub fn hotkey_spec(&self) -> HotkeySpec { HotkeySpec::parse_or_default(&self.hotkey) }
}

/// Errors that can occur when loading or saving the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error(
        "No configuration file found. Expected at ~/.config/window-scatter/config.jsonc \
         or in the platform configuration directory"
    )]
    NotFound,
    /// The configuration file exists but could not be read or written.
    #[error("Failed to access configuration file: {0}")]
    IoError(#[from] std::io::Error),
    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Directory name used under every configuration root.
const CONFIG_DIR_NAME: &str = "window-scatter";

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Returns the possible configuration file paths in priority order.
///
/// The function checks the following locations (both `.jsonc` and `.json` variants):
/// 1. `$XDG_CONFIG_HOME/window-scatter/` if the variable is set
/// 2. `~/.config/window-scatter/`
/// 3. The platform configuration directory (`%APPDATA%\window-scatter\` on Windows)
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        roots.push(PathBuf::from(xdg_config));
    }
    if let Some(home) = dirs::home_dir() {
        roots.push(home.join(".config"));
    }
    if let Some(config_dir) = dirs::config_dir() {
        roots.push(config_dir);
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    for root in roots {
        let dir = root.join(CONFIG_DIR_NAME);
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            // XDG_CONFIG_HOME and the platform directory may both be ~/.config
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    paths
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of the expected locations.
/// Returns `ConfigError::IoError` if a configuration file exists but could not be read.
/// Returns `ConfigError::ParseError` if the configuration file contains invalid JSON.
pub fn load_config() -> Result<(ScatterConfig, PathBuf), ConfigError> {
    config_paths()
        .into_iter()
        .find(|path| path.exists())
        .map_or(Err(ConfigError::NotFound), |path| load_config_from_path(&path))
}

/// Loads the configuration from a specific file.
///
/// Comments are stripped before parsing.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist, `IoError` if
/// it cannot be read and `ParseError` if it is not valid JSON.
pub fn load_config_from_path(path: &PathBuf) -> Result<(ScatterConfig, PathBuf), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let file = fs::File::open(path)?;
    // Strip comments from JSONC before parsing
    let reader = json_comments::StripComments::new(file);
    let config: ScatterConfig = serde_json::from_reader(reader)?;
    Ok((config, path.clone()))
}

/// Writes the configuration as pretty-printed JSON.
///
/// Creates parent directories if they don't exist. Comments of an existing
/// file are not preserved.
///
/// # Errors
///
/// Returns `ConfigError::IoError` if the file cannot be written.
pub fn save_config_to_path(config: &ScatterConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut json = serde_json::to_string_pretty(config)?;
    json.push('\n');
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScatterConfig::default();
        assert_eq!(config.hotkey, "Win+W");
        assert!(!config.hot_corner.is_enabled());
        assert_eq!(config.hot_corner.position, HotCornerPosition::TopLeft);
        assert_eq!(config.hot_corner.delay(), Duration::from_millis(500));
        assert_eq!(config.animation.duration(), Duration::from_millis(250));
        assert_eq!(config.backdrop.blur, 40);
        assert_eq!(config.max_windows, 20);
        assert!(config.excluded_titles.is_empty());
    }

    #[test]
    fn test_config_deserializes_partial_jsonc() {
        let json = r#"{
            // Open with Ctrl+Alt+W
            "hotkey": "Ctrl+Alt+W",
            "hotCorner": { "enabled": true, "position": "bottomRight" },
            /* faster */
            "animation": { "duration": 150 }
        }"#;
        let reader = json_comments::StripComments::new(json.as_bytes());
        let config: ScatterConfig = serde_json::from_reader(reader).unwrap();

        assert_eq!(config.hotkey, "Ctrl+Alt+W");
        assert!(config.hot_corner.enabled);
        assert_eq!(config.hot_corner.position, HotCornerPosition::BottomRight);
        assert_eq!(config.hot_corner.delay, 500);
        assert_eq!(config.animation.duration(), Duration::from_millis(150));
        assert_eq!(config.backdrop.blur, 40);
    }

    #[test]
    fn test_animation_duration_is_clamped() {
        assert_eq!(AnimationConfig { duration: 0 }.duration(), Duration::from_millis(50));
        assert_eq!(AnimationConfig { duration: 60_000 }.duration(), Duration::from_millis(1000));
    }

    #[test]
    fn test_invalid_hotkey_falls_back() {
        let config = ScatterConfig { hotkey: "Ctrl+Nope".to_string(), ..Default::default() };
        assert_eq!(config.hotkey_spec(), HotkeySpec::default());
    }

    #[test]
    fn test_config_paths_are_not_empty() {
        let paths = config_paths();
        assert!(!paths.is_empty());
        assert!(paths.iter().all(|p| p.to_string_lossy().contains(CONFIG_DIR_NAME)));
    }

    #[test]
    fn test_load_from_missing_path() {
        let path = PathBuf::from("/definitely/not/here/config.jsonc");
        assert!(matches!(load_config_from_path(&path), Err(ConfigError::NotFound)));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = ScatterConfig {
            hotkey: "Alt+F1".to_string(),
            max_windows: 8,
            excluded_titles: vec!["Spotify".to_string()],
            ..Default::default()
        };

        save_config_to_path(&config, &path).unwrap();
        let (loaded, loaded_path) = load_config_from_path(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded_path, path);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ \"hotkey\": ").unwrap();
        assert!(matches!(load_config_from_path(&path), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_string(&ScatterConfig::default()).unwrap();
        assert!(json.contains("\"hotCorner\""));
        assert!(json.contains("\"maxWindows\""));
        assert!(json.contains("\"excludedTitles\""));
        assert!(!json.contains("$schema"));
    }
}
