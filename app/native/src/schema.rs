//! JSON Schema of the configuration file.

use crate::config::ScatterConfig;

/// Generates a JSON Schema for the Window Scatter configuration.
///
/// The schema includes all configuration options with their types,
/// descriptions, and default values.
#[must_use]
pub fn generate_schema() -> schemars::Schema {
    let mut schema = schemars::schema_for!(ScatterConfig);

    // Add $id for proper schema identification
    if let Some(obj) = schema.as_object_mut() {
        obj.insert(
            "$id".to_string(),
            serde_json::json!(
                "https://raw.githubusercontent.com/window-scatter/window-scatter/main/window-scatter.schema.json"
            ),
        );
    }

    schema
}

/// Generates a pretty-printed JSON Schema string for the configuration.
#[must_use]
pub fn print_schema() -> String {
    let schema = generate_schema();
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_produces_valid_json() {
        let parsed: serde_json::Value = serde_json::from_str(&print_schema()).unwrap();

        assert!(parsed["$id"].as_str().unwrap().ends_with("window-scatter.schema.json"));
        assert_eq!(parsed["title"], "ScatterConfig");
        assert!(parsed["properties"]["hotkey"].is_object());
        assert!(parsed["properties"]["hotCorner"].is_object());
        assert!(parsed["properties"]["maxWindows"].is_object());
    }

    #[test]
    fn test_schema_contains_nested_configs() {
        let parsed: serde_json::Value = serde_json::from_str(&print_schema()).unwrap();
        assert!(parsed["$defs"]["HotCornerConfig"].is_object());
        assert!(parsed["$defs"]["HotCornerPosition"].is_object());
        assert!(parsed["$defs"]["AnimationConfig"].is_object());
        assert!(parsed["$defs"]["BackdropConfig"].is_object());
    }
}
