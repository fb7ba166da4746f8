//! Terminal rendering shared by the CLI commands.
//!
//! Layout plans and configurations are printed as indented JSON with keys in
//! cyan, strings in green, numbers in yellow and `true`/`false`/`null` in
//! magenta. Rendering walks the [`serde_json::Value`] tree directly, so the
//! output always has the shape `serde_json` would pretty-print.

use std::fmt::Write;

use colored::Colorize;
use serde_json::Value;

const INDENT: &str = "  ";

/// Prints a JSON value with syntax highlighting.
pub fn print_highlighted_json(value: &Value) { println!("{}", highlight_json(value)); }

/// Renders a JSON value as indented, colored text.
#[must_use]
pub fn highlight_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => {
            let _ = write!(out, "{}", "null".magenta());
        }
        Value::Bool(flag) => {
            let _ = write!(out, "{}", flag.to_string().magenta());
        }
        Value::Number(number) => {
            let _ = write!(out, "{}", number.to_string().yellow());
        }
        Value::String(text) => {
            let _ = write!(out, "{}", quoted(text).green());
        }
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                separator(out, index, depth + 1);
                write_value(out, item, depth + 1);
            }
            close(out, ']', depth);
        }
        Value::Object(fields) if fields.is_empty() => out.push_str("{}"),
        Value::Object(fields) => {
            out.push('{');
            for (index, (key, field)) in fields.iter().enumerate() {
                separator(out, index, depth + 1);
                let _ = write!(out, "{}: ", quoted(key).cyan());
                write_value(out, field, depth + 1);
            }
            close(out, '}', depth);
        }
    }
}

fn separator(out: &mut String, index: usize, depth: usize) {
    if index > 0 {
        out.push(',');
    }
    out.push('\n');
    out.push_str(&INDENT.repeat(depth));
}

fn close(out: &mut String, bracket: char, depth: usize) {
    out.push('\n');
    out.push_str(&INDENT.repeat(depth));
    out.push(bracket);
}

/// JSON string literal with escapes.
fn quoted(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{text}\""))
}

/// Shortens `text` to at most `max_chars` characters, ending with `…` when cut.
#[must_use]
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Green check or red cross for table cells.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value { "✓".green().to_string() } else { "✗".red().to_string() }
}
