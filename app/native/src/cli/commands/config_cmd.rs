//! Config CLI commands.
//!
//! Commands for managing the Window Scatter configuration file.

use std::path::PathBuf;

use clap::Subcommand;
use colored::Colorize;

use crate::cli::output;
use crate::config::template::{create_config_file, generate_config_template};
use crate::config::{self, config_paths};
use crate::error::ScatterError;
use crate::schema;

/// Config management commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum ConfigCommands {
    /// Initialize a new configuration file with all options documented.
    ///
    /// Creates a new configuration file at the default location with all
    /// available options commented out. This allows you to see all possible
    /// configuration options and uncomment the ones you want to use.
    #[command(
        name = "init",
        after_long_help = r#"Examples:
  scatter config init              # Create config at default location
  scatter config init --force      # Overwrite existing config
  scatter config init --path my-config.jsonc  # Create at custom path
  scatter config init --stdout     # Print template to stdout"#
    )]
    Init {
        /// Overwrite existing configuration file if it exists.
        #[arg(long, short)]
        force: bool,

        /// Custom path for the configuration file.
        /// If not specified, uses the first search path (see `scatter config path`).
        #[arg(long, short, value_name = "PATH")]
        path: Option<PathBuf>,

        /// Print the configuration template to stdout instead of writing to a file.
        #[arg(long)]
        stdout: bool,
    },

    /// Show the path to the configuration file.
    ///
    /// Displays the path where Window Scatter looks for configuration files,
    /// and indicates which one is currently in use (if any).
    Path,

    /// Show the effective configuration.
    ///
    /// Loads the configuration the same way the overlay does (falling back
    /// to defaults) and prints it as JSON.
    Show,

    /// Output the configuration JSON Schema.
    ///
    /// Same as `scatter schema`.
    Schema,
}

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cmd: &ConfigCommands) -> Result<(), ScatterError> {
    match cmd {
        ConfigCommands::Init { force, path, stdout } => {
            if *stdout {
                print_config_template()
            } else {
                init_config(*force, path.clone())
            }
        }
        ConfigCommands::Path => show_config_path(),
        ConfigCommands::Show => show_config(),
        ConfigCommands::Schema => {
            println!("{}", schema::print_schema());
            Ok(())
        }
    }
}

/// Print the configuration template to stdout.
#[allow(clippy::unnecessary_wraps)] // Consistent return type with other CLI functions
fn print_config_template() -> Result<(), ScatterError> {
    println!("{}", generate_config_template());
    Ok(())
}

/// Initialize a new configuration file.
fn init_config(force: bool, custom_path: Option<PathBuf>) -> Result<(), ScatterError> {
    let config_path = custom_path.unwrap_or_else(|| {
        // Use the first config path (preferred location)
        config_paths()
            .into_iter()
            .next()
            .unwrap_or_else(|| PathBuf::from("config.jsonc"))
    });

    // Check if file already exists
    if config_path.exists() && !force {
        return Err(ScatterError::ConfigError(format!(
            "Configuration file already exists at: {}\nUse --force to overwrite.",
            config_path.display()
        )));
    }

    // Create the config file using the shared function
    create_config_file(&config_path).map_err(|e| {
        ScatterError::ConfigError(format!(
            "Failed to create config file {}: {e}",
            config_path.display()
        ))
    })?;

    println!("Configuration file created at: {}", config_path.display());
    println!("\nAll options are commented out by default.");
    println!("Edit the file and uncomment the options you want to configure.");

    Ok(())
}

/// Show the configuration file path.
#[allow(clippy::unnecessary_wraps)] // Consistent return type with other CLI functions
fn show_config_path() -> Result<(), ScatterError> {
    println!("Configuration file search paths (in priority order):\n");

    let paths = config_paths();
    let mut found_config = false;

    for (i, path) in paths.iter().enumerate() {
        let exists = path.exists();
        let marker = if exists && !found_config {
            found_config = true;
            " (active)"
        } else if exists {
            " (exists)"
        } else {
            ""
        };

        println!("  {}. {}{}", i + 1, path.display(), marker);
    }

    if !found_config {
        println!("\nNo configuration file found.");
        println!("Run 'scatter config init' to create one.");
    }

    Ok(())
}

/// Print the effective configuration as highlighted JSON.
fn show_config() -> Result<(), ScatterError> {
    let current = config::get_config();
    let value = serde_json::to_value(current)?;

    match config::get_config_path() {
        Some(path) => println!("{} {}\n", "Loaded from:".bold(), path.display()),
        None => println!("{}\n", "Using built-in defaults.".dimmed()),
    }
    output::print_highlighted_json(&value);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_paths_returns_non_empty() {
        let paths = config_paths();
        // Should have at least one path (unless no home directory)
        assert!(!paths.is_empty() || dirs::home_dir().is_none());
    }

    #[test]
    fn test_init_config_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.jsonc");
        std::fs::write(&path, "{}").unwrap();

        let err = init_config(false, Some(path.clone())).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_init_config_force_writes_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.jsonc");

        init_config(true, Some(path.clone())).unwrap();
        let (loaded, _) = crate::config::load_config_from_path(&path).unwrap();
        assert_eq!(loaded.hotkey, crate::config::ScatterConfig::default().hotkey);
    }
}
