mod cli;
mod json;

pub use cli::{print_components_table, print_entries_table, print_entry_table};
pub use json::print_json;

use crate::components::AffectedComponent;
use crate::model::Entry;
use anyhow::Result;
use serde::Serialize;

/// Output format for lookup results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON format for programmatic use
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use 'table' or 'json'", s)),
        }
    }
}

/// The components of one entry, as printed by `govulndb components`.
#[derive(Debug, Serialize)]
pub struct ComponentReport<'a> {
    pub id: &'a str,
    pub packages: &'a [AffectedComponent],
    pub modules: &'a [AffectedComponent],
}

pub fn print_entries(entries: &[Entry], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_entries_table(entries),
        OutputFormat::Json => print_json(entries),
    }
}

pub fn print_entry(entry: &Entry, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_entry_table(entry),
        OutputFormat::Json => print_json(entry),
    }
}

pub fn print_components(report: &ComponentReport<'_>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_components_table(report),
        OutputFormat::Json => print_json(report),
    }
}
