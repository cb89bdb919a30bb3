//! Report rendering backends
//!
//! The backends are straightforward projections of the computed record
//! collection: an analyzed table (resolved and latest releases, lateness
//! count) and a failures table (everything that did not reach the analyzed
//! state). The reference timestamp used for humanized ages is passed in
//! explicitly so rendering stays deterministic.

mod csv;
mod json;
mod text;

pub use self::csv::CsvFormatter;
pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::domain::{RequirementRecord, RequirementStatus};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::io::Write;

/// Report format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    /// Console tables
    #[default]
    Text,
    /// Structured JSON of the same tables
    Json,
    /// CSV tables
    Csv,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReportFormat::Text => "text",
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
        };
        write!(f, "{}", name)
    }
}

/// Rendering options shared by all backends
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    /// Include the failures table
    pub with_failures: bool,
    /// Reference timestamp for humanized ages
    pub now: DateTime<Utc>,
    /// Whether to use colors (text backend only)
    pub color: bool,
}

/// Trait for report formatters
pub trait ReportFormatter {
    /// Format and write the record collection
    fn format(
        &self,
        records: &[RequirementRecord],
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;
}

/// Create the formatter for a report format
pub fn create_formatter(format: ReportFormat, options: ReportOptions) -> Box<dyn ReportFormatter> {
    match format {
        ReportFormat::Text => Box::new(TextFormatter::new(options)),
        ReportFormat::Json => Box::new(JsonFormatter::new(options)),
        ReportFormat::Csv => Box::new(CsvFormatter::new(options)),
    }
}

/// One row of the analyzed table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzedRow {
    pub key: usize,
    pub name: String,
    pub lateness: String,
    pub required: String,
    pub latest_release: String,
}

/// One row of the failures table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRow {
    pub key: usize,
    pub source: String,
    pub status: String,
    pub resume: String,
}

/// Project analyzed records into table rows, numbered from 1
pub fn analyzed_rows(records: &[RequirementRecord], now: DateTime<Utc>) -> Vec<AnalyzedRow> {
    records
        .iter()
        .filter(|record| record.status == RequirementStatus::Analyzed)
        .enumerate()
        .map(|(index, record)| {
            let lateness = match &record.lateness {
                Some(entries) if !entries.is_empty() => entries.len().to_string(),
                _ => "-".to_string(),
            };

            let required = match (&record.resolved_version, record.resolved_published) {
                (Some(version), Some(published)) => {
                    format!("{} - {} ago", version, humanize_delta(now - published))
                }
                (Some(version), None) => version.to_string(),
                // No resolution means the requirement can use the latest
                _ => "Latest".to_string(),
            };

            let latest_release = match (&record.highest_version, record.highest_published) {
                (Some(version), Some(published)) => {
                    format!(
                        "{} - {} ago",
                        version,
                        capitalize(&humanize_delta(now - published))
                    )
                }
                (Some(version), None) => version.to_string(),
                _ => "-".to_string(),
            };

            AnalyzedRow {
                key: index + 1,
                name: record.name.clone().unwrap_or_default(),
                lateness,
                required,
                latest_release,
            }
        })
        .collect()
}

/// Project non-analyzed records into failure rows, numbered from 1
pub fn failure_rows(records: &[RequirementRecord]) -> Vec<FailureRow> {
    records
        .iter()
        .filter(|record| record.status != RequirementStatus::Analyzed)
        .enumerate()
        .map(|(index, record)| {
            let mut resume = record.status.label().to_string();
            if record.status == RequirementStatus::Invalid {
                if let Some(parse_error) = &record.parse_error {
                    resume = format!("{}: {}", resume, parse_error);
                }
            }

            FailureRow {
                key: index + 1,
                source: record.source.clone(),
                status: record.status.to_string(),
                resume,
            }
        })
        .collect()
}

/// Humanize a duration into its largest natural unit
pub fn humanize_delta(delta: Duration) -> String {
    let seconds = delta.num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    let months = days / 30;
    let years = days / 365;

    if seconds < 60 {
        "a moment".to_string()
    } else if minutes < 2 {
        "a minute".to_string()
    } else if minutes < 60 {
        format!("{} minutes", minutes)
    } else if hours < 2 {
        "an hour".to_string()
    } else if hours < 24 {
        format!("{} hours", hours)
    } else if days < 2 {
        "a day".to_string()
    } else if days < 30 {
        format!("{} days", days)
    } else if months < 2 {
        "a month".to_string()
    } else if days < 365 {
        format!("{} months", months)
    } else if years < 2 {
        "a year".to_string()
    } else {
        format!("{} years", years)
    }
}

fn capitalize(content: &str) -> String {
    let mut chars = content.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
