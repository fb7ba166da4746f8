//! Configuration template generation.
//!
//! Generates a commented configuration template with all available options.

use std::fs;
use std::path::Path;

/// Generates a configuration template with all options commented out.
///
/// This creates a JSONC file with documentation for every available
/// configuration option, showing its default value.
#[must_use]
pub fn generate_config_template() -> String {
    r#"// Window Scatter Configuration File
// ==================================
// This file uses JSONC format (JSON with comments).
// All options below are commented out and show their default values.
// Uncomment and modify the options you want to configure.

{
  // ============================================================================
  // Hotkey
  // ============================================================================
  // Chord that shows the overlay: "+"-separated modifiers followed by one key.
  // Modifiers: ctrl, alt, shift, win
  // Keys: A-Z, 0-9, F1-F12, tab, enter, space, esc, backspace, delete, insert,
  //       home, end, pageup, pagedown, left, up, right, down
  // "hotkey": "Win+W",

  // ============================================================================
  // Hot Corner
  // ============================================================================
  // Show the overlay by resting the cursor in a screen corner
  // "hotCorner": {
  //   // Enable or disable the hot corner
  //   "enabled": false,
  //
  //   // Corner to watch: "topLeft", "topRight", "bottomLeft" or "bottomRight"
  //   "position": "topLeft",
  //
  //   // Time in milliseconds the cursor must stay in the corner
  //   "delay": 500
  // },

  // ============================================================================
  // Animation
  // ============================================================================
  // "animation": {
  //   // Duration of the scatter and return animations in milliseconds (50-1000)
  //   "duration": 250
  // },

  // ============================================================================
  // Backdrop
  // ============================================================================
  // "backdrop": {
  //   // Blur radius in pixels of the wallpaper behind the thumbnails (0 = no blur)
  //   "blur": 40
  // },

  // ============================================================================
  // Windows
  // ============================================================================
  // Maximum number of windows shown at once
  // "maxWindows": 20,

  // Additional window titles to ignore (case-insensitive substring match)
  // "excludedTitles": []
}
"#
    .to_string()
}

/// Creates a configuration file with the template at the specified path.
///
/// Creates parent directories if they don't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn create_config_file(path: &Path) -> Result<(), std::io::Error> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Write the template
    fs::write(path, generate_config_template())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScatterConfig;

    #[test]
    fn test_generate_config_template_is_valid_jsonc() {
        let template = generate_config_template();
        let reader = json_comments::StripComments::new(template.as_bytes());
        let config: ScatterConfig = serde_json::from_reader(reader).unwrap();
        assert_eq!(config, ScatterConfig::default());
    }

    #[test]
    fn test_generate_config_template_contains_all_sections() {
        let template = generate_config_template();
        assert!(template.contains("hotkey"));
        assert!(template.contains("hotCorner"));
        assert!(template.contains("animation"));
        assert!(template.contains("backdrop"));
        assert!(template.contains("maxWindows"));
        assert!(template.contains("excludedTitles"));
    }

    #[test]
    fn test_create_config_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("window-scatter").join("config.jsonc");
        create_config_file(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), generate_config_template());
    }
}
