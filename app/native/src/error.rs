//! Error types for Window Scatter.
//!
//! This module provides the crate-level error type returned by the CLI and
//! the desktop entry point. Each concern keeps its own error enum and
//! converts into [`ScatterError`] at the boundary.

use thiserror::Error;

use crate::backdrop::BackdropError;
use crate::config::ConfigError;
use crate::hotkey::HotkeyError;
use crate::platform::PlatformError;

/// Errors that can occur during application execution.
#[derive(Debug, Error)]
pub enum ScatterError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Hotkey could not be parsed.
    #[error("Hotkey error: {0}")]
    HotkeyError(#[from] HotkeyError),
    /// Window system or compositor failure.
    #[error("Platform error: {0}")]
    PlatformError(#[from] PlatformError),
    /// Wallpaper could not be loaded or processed.
    #[error("Backdrop error: {0}")]
    BackdropError(#[from] BackdropError),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    /// The desktop overlay only runs on Windows.
    #[error("The desktop overlay is only supported on Windows")]
    UnsupportedPlatform,
}

impl From<ConfigError> for ScatterError {
    fn from(err: ConfigError) -> Self { Self::ConfigError(err.to_string()) }
}

impl From<serde_json::Error> for ScatterError {
    fn from(err: serde_json::Error) -> Self { Self::InvalidArguments(err.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScatterError::InvalidArguments("bad canvas".to_string());
        assert_eq!(err.to_string(), "bad canvas");

        let err = ScatterError::ConfigError("missing".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing");
    }

    #[test]
    fn test_from_hotkey_error() {
        let err: ScatterError = HotkeyError::Empty.into();
        assert!(matches!(err, ScatterError::HotkeyError(HotkeyError::Empty)));
        assert_eq!(err.to_string(), "Hotkey error: Hotkey is empty");
    }

    #[test]
    fn test_from_config_error() {
        let err: ScatterError = ConfigError::NotFound.into();
        assert!(err.to_string().starts_with("Configuration error: No configuration file found"));
    }

    #[test]
    fn test_from_platform_error() {
        let err: ScatterError = PlatformError::NoHostSurface.into();
        assert!(matches!(err, ScatterError::PlatformError(_)));
    }
}
