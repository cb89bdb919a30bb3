//! Console report formatter
//!
//! Renders the analyzed and failure tables for terminal display. Colors
//! are confined to the section titles so table column widths stay exact.

use crate::domain::RequirementRecord;
use crate::output::{analyzed_rows, failure_rows, ReportFormatter, ReportOptions};
use colored::Colorize;
use std::io::Write;
use tabled::builder::Builder;
use tabled::settings::Style;

/// Text formatter for human-readable console output
pub struct TextFormatter {
    options: ReportOptions,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    fn title(&self, label: &str) -> String {
        if self.options.color {
            label.cyan().bold().to_string()
        } else {
            label.to_string()
        }
    }
}

impl ReportFormatter for TextFormatter {
    fn format(
        &self,
        records: &[RequirementRecord],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let analyzed = analyzed_rows(records, self.options.now);

        let mut builder = Builder::default();
        builder.push_record(["#", "Name", "Lateness", "Required", "Latest release"]);
        for row in &analyzed {
            builder.push_record([
                row.key.to_string(),
                row.name.clone(),
                row.lateness.clone(),
                row.required.clone(),
                row.latest_release.clone(),
            ]);
        }
        let mut table = builder.build();
        table.with(Style::sharp());

        writeln!(writer, "{}", self.title("Analyzed"))?;
        writeln!(writer, "{}", table)?;

        if self.options.with_failures {
            let failures = failure_rows(records);
            if !failures.is_empty() {
                let mut builder = Builder::default();
                builder.push_record(["#", "Source", "Status", "Resume"]);
                for row in &failures {
                    builder.push_record([
                        row.key.to_string(),
                        row.source.clone(),
                        row.status.clone(),
                        row.resume.clone(),
                    ]);
                }
                let mut table = builder.build();
                table.with(Style::sharp());

                writeln!(writer)?;
                writeln!(writer, "{}", self.title("Failures"))?;
                writeln!(writer, "{}", table)?;
            }
        }

        Ok(())
    }
}
