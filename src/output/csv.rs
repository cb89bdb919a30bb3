//! CSV report formatter
//!
//! Writes the analyzed table and, optionally, the failures table separated
//! by a blank line. All fields are quoted.

use crate::domain::RequirementRecord;
use crate::output::{analyzed_rows, failure_rows, ReportFormatter, ReportOptions};
use std::io::Write;

/// CSV formatter for spreadsheet-friendly reports
pub struct CsvFormatter {
    options: ReportOptions,
}

impl CsvFormatter {
    /// Create a new CSV formatter
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    fn write_table(&self, headers: &[&str], rows: Vec<Vec<String>>) -> std::io::Result<Vec<u8>> {
        let mut table = ::csv::WriterBuilder::new()
            .quote_style(::csv::QuoteStyle::Always)
            .from_writer(Vec::new());

        table.write_record(headers).map_err(std::io::Error::other)?;
        for row in rows {
            table.write_record(&row).map_err(std::io::Error::other)?;
        }

        table
            .into_inner()
            .map_err(|error| std::io::Error::other(error.into_error()))
    }
}

impl ReportFormatter for CsvFormatter {
    fn format(
        &self,
        records: &[RequirementRecord],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let analyzed = analyzed_rows(records, self.options.now)
            .into_iter()
            .map(|row| {
                vec![
                    row.key.to_string(),
                    row.name,
                    row.lateness,
                    row.required,
                    row.latest_release,
                ]
            })
            .collect();

        let payload = self.write_table(
            &["key", "name", "lateness", "required", "latest_release"],
            analyzed,
        )?;
        writer.write_all(&payload)?;

        if self.options.with_failures {
            let failures: Vec<Vec<String>> = failure_rows(records)
                .into_iter()
                .map(|row| vec![row.key.to_string(), row.source, row.status, row.resume])
                .collect();

            if !failures.is_empty() {
                let payload = self.write_table(&["key", "source", "status", "resume"], failures)?;
                writeln!(writer)?;
                writer.write_all(&payload)?;
            }
        }

        Ok(())
    }
}
