//! Output helpers for CLI commands.
//!
//! Results go to stdout as pretty JSON; warnings go to stderr so the JSON
//! stays pipeable.

use anyhow::Context;
use serde::Serialize;

/// Formats one resolution warning for the terminal.
#[must_use]
pub fn format_warning(warning: &str) -> String {
    format!("WARNING: {warning}")
}

/// Prints resolution warnings to stderr.
pub fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("{}", format_warning(warning));
    }
}

/// Prints a value as pretty JSON to stdout.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}
