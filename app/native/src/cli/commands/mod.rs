//! CLI command definitions using Clap.
//!
//! This module defines all CLI commands and their arguments, organized into
//! domain-specific submodules:
//!
//! - `config_cmd` - Configuration file management commands
//! - `hotkey` - Hotkey chord inspection
//! - `layout` - Offline layout calculation on synthetic windows

use std::io;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};

use crate::error::ScatterError;
use crate::{config, schema};

pub mod config_cmd;
pub mod hotkey;
pub mod layout;

// Re-export commonly used types for convenience
pub use config_cmd::ConfigCommands;
pub use layout::LayoutArgs;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Window Scatter CLI - live thumbnails of every open window.
#[derive(Parser, Debug)]
#[command(name = "scatter")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Start the overlay.
    ///
    /// Installs the keyboard hook and waits for the hotkey or the hot corner.
    /// This is equivalent to running `scatter` without any arguments.
    Run,

    /// Configuration file management commands.
    ///
    /// Initialize, view, and manage the configuration file.
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Parse a hotkey chord and describe it.
    ///
    /// Exits with an error when the chord is invalid, which makes it handy
    /// for checking a value before putting it in the configuration file.
    #[command(after_long_help = r#"Examples:
  scatter hotkey Win+W
  scatter hotkey "Ctrl+Alt+Tab""#)]
    Hotkey {
        /// Chord such as `Ctrl+Alt+S`. The key must come last.
        chord: String,
    },

    /// Calculate a scatter layout for synthetic windows.
    ///
    /// Runs the same layout calculation the overlay uses and prints where
    /// each window's thumbnail would be placed.
    Layout(LayoutArgs),

    /// Output Window Scatter configuration JSON Schema.
    ///
    /// Outputs a JSON Schema to stdout that describes the structure of the
    /// configuration file. Can be redirected to a file for use with editors
    /// that support JSON Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Outputs shell completion script to stdout for the specified shell.
    /// Can be used with eval or redirected to a file.
    ///
    /// Usage:
    ///   scatter completions --shell powershell >> $PROFILE
    ///   eval "$(scatter completions --shell bash)"
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },

    /// Launch the desktop overlay.
    ///
    /// Equivalent to `scatter run`.
    #[command(name = "--desktop", hide = true)]
    Desktop,
}

impl Cli {
    /// Returns the custom config path if specified via --config flag.
    #[must_use]
    pub fn config_path(&self) -> Option<std::path::PathBuf> {
        self.config.as_ref().map(std::path::PathBuf::from)
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), ScatterError> {
        // Set custom config path if provided
        if let Some(ref path) = self.config {
            let path_buf = std::path::PathBuf::from(path);
            if !path_buf.exists() {
                return Err(ScatterError::ConfigError(format!(
                    "Configuration file not found: {path}"
                )));
            }
            config::set_custom_config_path(path_buf);
        }

        match &self.command {
            Commands::Run | Commands::Desktop => crate::run(),
            Commands::Config(cmd) => config_cmd::execute(cmd),
            Commands::Hotkey { chord } => hotkey::execute(chord),
            Commands::Layout(args) => layout::execute(args),

            Commands::Schema => {
                let schema_output = schema::print_schema();
                println!("{schema_output}");
                Ok(())
            }

            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "scatter", &mut io::stdout());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // CLI parsing tests
    // ========================================================================

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from(["scatter", "run"]).unwrap();
        assert!(matches!(cli.command, Commands::Run));
    }

    #[test]
    fn test_cli_parses_schema() {
        let cli = Cli::try_parse_from(["scatter", "schema"]).unwrap();
        assert!(matches!(cli.command, Commands::Schema));
    }

    #[test]
    fn test_cli_parses_completions_powershell() {
        let cli = Cli::try_parse_from(["scatter", "completions", "--shell", "powershell"]).unwrap();
        match cli.command {
            Commands::Completions { shell } => assert_eq!(shell, Shell::PowerShell),
            _ => panic!("Expected Completions command"),
        }
    }

    #[test]
    fn test_cli_parses_completions_bash() {
        let cli = Cli::try_parse_from(["scatter", "completions", "-s", "bash"]).unwrap();
        match cli.command {
            Commands::Completions { shell } => assert_eq!(shell, Shell::Bash),
            _ => panic!("Expected Completions command"),
        }
    }

    #[test]
    fn test_cli_parses_hotkey() {
        let cli = Cli::try_parse_from(["scatter", "hotkey", "Ctrl+Alt+S"]).unwrap();
        match cli.command {
            Commands::Hotkey { chord } => assert_eq!(chord, "Ctrl+Alt+S"),
            _ => panic!("Expected Hotkey command"),
        }
    }

    #[test]
    fn test_cli_hotkey_requires_chord() {
        assert!(Cli::try_parse_from(["scatter", "hotkey"]).is_err());
    }

    #[test]
    fn test_cli_parses_config_show() {
        let cli = Cli::try_parse_from(["scatter", "config", "show"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(ConfigCommands::Show)));
    }

    #[test]
    fn test_cli_parses_config_path() {
        let cli = Cli::try_parse_from(["scatter", "config", "path"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(ConfigCommands::Path)));
    }

    #[test]
    fn test_cli_parses_config_schema() {
        let cli = Cli::try_parse_from(["scatter", "config", "schema"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(ConfigCommands::Schema)));
    }

    #[test]
    fn test_cli_parses_config_init_flags() {
        let cli = Cli::try_parse_from([
            "scatter",
            "config",
            "init",
            "--force",
            "--path",
            "C:/tmp/scatter.jsonc",
        ])
        .unwrap();
        match cli.command {
            Commands::Config(ConfigCommands::Init { force, path, stdout }) => {
                assert!(force);
                assert!(!stdout);
                assert_eq!(path, Some(std::path::PathBuf::from("C:/tmp/scatter.jsonc")));
            }
            _ => panic!("Expected Config Init command"),
        }
    }

    #[test]
    fn test_cli_parses_layout() {
        let cli = Cli::try_parse_from([
            "scatter",
            "layout",
            "--canvas",
            "2560x1440",
            "--window",
            "800x600",
            "--window",
            "1024x768@10,20",
            "--seed",
            "7",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Layout(args) => {
                assert_eq!(args.canvas.width, 2560);
                assert_eq!(args.canvas.height, 1440);
                assert_eq!(args.windows.len(), 2);
                assert_eq!(args.windows[1].origin, Some((10, 20)));
                assert_eq!(args.seed, Some(7));
                assert!(args.json);
            }
            _ => panic!("Expected Layout command"),
        }
    }

    #[test]
    fn test_cli_layout_rejects_bad_canvas() {
        assert!(Cli::try_parse_from(["scatter", "layout", "--canvas", "wide"]).is_err());
    }

    #[test]
    fn test_cli_global_config_flag() {
        let cli = Cli::try_parse_from(["scatter", "schema", "--config", "my.jsonc"]).unwrap();
        assert_eq!(cli.config_path(), Some(std::path::PathBuf::from("my.jsonc")));
    }

    #[test]
    fn test_cli_rejects_unknown_command() {
        assert!(Cli::try_parse_from(["scatter", "tiling"]).is_err());
    }
}
