//! Hotkey CLI command.
//!
//! Parses a chord with the same rules the keyboard hook uses and prints its
//! canonical form.

use colored::Colorize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::cli::output;
use crate::error::ScatterError;
use crate::hotkey::{HotkeySpec, Modifiers, key_name};

#[derive(Tabled)]
struct ModifierRow {
    #[tabled(rename = "Modifier")]
    name: &'static str,
    #[tabled(rename = "Held")]
    held: String,
}

/// Execute the hotkey command.
///
/// # Errors
///
/// Returns an error if the chord cannot be parsed.
pub fn execute(chord: &str) -> Result<(), ScatterError> {
    let spec = HotkeySpec::parse(chord)?;

    println!("{} {}", "Hotkey:".bold(), spec.to_string().green());
    println!("{} {} (0x{:02X})", "Key:".bold(), key_name(spec.key()), spec.key());

    let table = Table::new(modifier_rows(spec))
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..2)).with(Alignment::center()))
        .to_string();
    println!("{table}");

    Ok(())
}

fn modifier_rows(spec: HotkeySpec) -> Vec<ModifierRow> {
    [
        ("Ctrl", Modifiers::CTRL),
        ("Alt", Modifiers::ALT),
        ("Shift", Modifiers::SHIFT),
        ("Win", Modifiers::WIN),
    ]
    .into_iter()
    .map(|(name, flag)| ModifierRow {
        name,
        held: output::format_bool(spec.modifiers().contains(flag)),
    })
    .collect()
}
