//! JSON report formatter
//!
//! Emits the same table projections as the console backend, as a single
//! object with `analyzed` and (optionally) `failures` arrays.

use crate::domain::RequirementRecord;
use crate::output::{
    analyzed_rows, failure_rows, AnalyzedRow, FailureRow, ReportFormatter, ReportOptions,
};
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable reports
pub struct JsonFormatter {
    options: ReportOptions,
}

#[derive(Serialize)]
struct JsonReport {
    analyzed: Vec<AnalyzedRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failures: Option<Vec<FailureRow>>,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(
        &self,
        records: &[RequirementRecord],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let report = JsonReport {
            analyzed: analyzed_rows(records, self.options.now),
            failures: self
                .options
                .with_failures
                .then(|| failure_rows(records)),
        };

        serde_json::to_writer_pretty(&mut *writer, &report)?;
        writeln!(writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::{analyzed_record, invalid_record, reference_now};

    fn render(records: &[RequirementRecord], with_failures: bool) -> serde_json::Value {
        let formatter = JsonFormatter::new(ReportOptions {
            with_failures,
            now: reference_now(),
            color: false,
        });
        let mut buffer = Vec::new();
        formatter.format(records, &mut buffer).unwrap();
        serde_json::from_slice(&buffer).unwrap()
    }

    #[test]
    fn test_report_structure() {
        let value = render(&[analyzed_record(), invalid_record()], true);

        assert_eq!(value["analyzed"][0]["name"], "diskette");
        assert_eq!(value["analyzed"][0]["lateness"], "3");
        assert_eq!(value["analyzed"][0]["required"], "0.3.3 - a month ago");
        assert_eq!(value["failures"][0]["status"], "invalid");
    }

    #[test]
    fn test_failures_key_is_absent_when_disabled() {
        let value = render(&[analyzed_record(), invalid_record()], false);
        assert!(value.get("failures").is_none());
        assert_eq!(value["analyzed"].as_array().unwrap().len(), 1);
    }
}
