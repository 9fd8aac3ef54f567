//! Output formatting
//!
//! Command results go to stdout in the selected format. Status lines go to
//! stderr so that JSON and YAML output stays parseable.

use crate::error::CliResult;
use colored::*;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Render rows in the given format; `empty` replaces an empty table.
pub fn render<T: Serialize + Tabled>(
    rows: Vec<T>,
    format: OutputFormat,
    empty: &str,
) -> CliResult<String> {
    Ok(match format {
        OutputFormat::Table if rows.is_empty() => empty.dimmed().to_string(),
        OutputFormat::Table => Table::new(rows).to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(&rows)?,
        OutputFormat::Yaml => serde_yaml::to_string(&rows)?,
    })
}

pub fn print_output<T: Serialize + Tabled>(
    rows: Vec<T>,
    format: OutputFormat,
    empty: &str,
) -> CliResult<()> {
    println!("{}", render(rows, format, empty)?);
    Ok(())
}

/// Print one document; tables fall back to JSON.
pub fn print_single<T: Serialize + ?Sized>(data: &T, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table | OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?)
        }
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(data)?),
    }
    Ok(())
}

pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message);
}
