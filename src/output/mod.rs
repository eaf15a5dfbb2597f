mod cli;
mod json;

pub use cli::{print_cli_table, print_feature_table, render_feature_table, render_table};
pub use json::{print_json, print_json_features};

use crate::model::BaselineInfo;
use crate::report::ScanReport;
use anyhow::Result;

/// Output format for scan results
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

pub fn print_report(report: &ScanReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_cli_table(report),
        OutputFormat::Json => print_json(report),
    }
}

/// Format report to string for file output
pub fn format_report_to_string(report: &ScanReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

/// Prints resolved baseline data for individual feature identifiers.
pub fn print_features(features: &[(String, BaselineInfo)], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_feature_table(features),
        OutputFormat::Json => print_json_features(features),
    }
}
