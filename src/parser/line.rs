//! Requirement line classifier
//!
//! Pure function from one raw line (plus an optional marker environment) to
//! a classified record. The prefix checks run before any grammar parsing,
//! in a fixed order, so tool flags, local paths and direct URLs never
//! surface as grammar errors.

use crate::domain::{marker_environment, Environment, RequirementRecord, RequirementStatus};
use pep508_rs::{Requirement, VerbatimUrl, VersionOrUrl};
use std::str::FromStr;

/// Classify a single requirement line into a terminal parse status.
///
/// An absent or empty environment means every marker is treated as
/// satisfied; `marker-reject` only happens when an environment was supplied
/// and the marker evaluates false against it.
pub fn classify(line: &str, environment: Option<&Environment>) -> RequirementRecord {
    let source = line.trim();

    if source.starts_with('-') {
        return RequirementRecord::new(source, RequirementStatus::UnsupportedArgument);
    }
    if source.starts_with('.') || source.starts_with('/') {
        return RequirementRecord::new(source, RequirementStatus::UnsupportedLocalpath);
    }
    if source.starts_with("http://") || source.starts_with("https://") {
        return RequirementRecord::new(source, RequirementStatus::UnsupportedUrl);
    }

    let parsed = match Requirement::<VerbatimUrl>::from_str(source) {
        Ok(parsed) => parsed,
        Err(error) => {
            let mut record = RequirementRecord::new(source, RequirementStatus::Invalid);
            record.parse_error = Some(error.to_string());
            return record;
        }
    };

    let mut record = RequirementRecord::new(source, RequirementStatus::Parsed);
    record.name = Some(parsed.name.to_string());
    record.extras = parsed.extras.iter().map(|extra| extra.to_string()).collect();
    match &parsed.version_or_url {
        Some(VersionOrUrl::VersionSpecifier(specifiers)) => {
            record.specifier = Some(specifiers.clone());
        }
        Some(VersionOrUrl::Url(url)) => record.url = Some(url.to_string()),
        None => {}
    }
    record.marker = parsed.marker.contents().map(|contents| contents.to_string());

    if record.marker.is_some() {
        if let Some(environment) = environment.filter(|env| !env.is_empty()) {
            if let Some(marker_env) = marker_environment(environment) {
                if !parsed.marker.evaluate(&marker_env, &[]) {
                    record.status = RequirementStatus::MarkerReject;
                }
            }
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Environment {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_argument_prefix_is_unsupported() {
        for source in ["-r dev.txt", "-e .", "--index-url https://example.com"] {
            let record = classify(source, None);
            assert_eq!(record.status, RequirementStatus::UnsupportedArgument);
            assert!(record.name.is_none());
            assert!(record.parse_error.is_none());
        }
    }

    #[test]
    fn test_localpath_prefix_is_unsupported() {
        for source in ["./downloads/numpy-1.9.2-cp34-none-win32.whl", "/opt/pkg"] {
            let record = classify(source, None);
            assert_eq!(record.status, RequirementStatus::UnsupportedLocalpath);
        }
    }

    #[test]
    fn test_url_prefix_is_unsupported() {
        for source in [
            "http://wxpython.org/Phoenix/snapshot-builds/wxPython-3.0.3.tar.gz",
            "https://example.com/pkg.tar.gz",
        ] {
            let record = classify(source, None);
            assert_eq!(record.status, RequirementStatus::UnsupportedUrl);
            // Prefix checks short-circuit, so this is never flagged invalid
            assert!(record.parse_error.is_none());
        }
    }

    #[test]
    fn test_bare_name_parses_without_specifier() {
        let record = classify("diskette", None);
        assert_eq!(record.status, RequirementStatus::Parsed);
        assert_eq!(record.name.as_deref(), Some("diskette"));
        assert!(record.specifier.is_none());
        assert!(record.marker.is_none());
    }

    #[test]
    fn test_specifier_and_extras_are_extracted() {
        let record = classify("requests[security,socks]>=2.8.1,==2.8.*", None);
        assert_eq!(record.status, RequirementStatus::Parsed);
        assert_eq!(record.name.as_deref(), Some("requests"));
        assert_eq!(record.extras, vec!["security", "socks"]);
        assert!(record.specifier.is_some());
    }

    #[test]
    fn test_direct_reference_records_url() {
        let record = classify(
            "urllib3 @ https://github.com/urllib3/urllib3/archive/refs/tags/1.26.8.zip",
            None,
        );
        assert_eq!(record.status, RequirementStatus::Parsed);
        assert_eq!(record.name.as_deref(), Some("urllib3"));
        assert!(record
            .url
            .as_deref()
            .is_some_and(|url| url.contains("github.com/urllib3")));
    }

    #[test]
    fn test_invalid_syntax_keeps_the_diagnostic() {
        let record = classify("foo>1,foo<=2", None);
        assert_eq!(record.status, RequirementStatus::Invalid);
        assert!(record.parse_error.is_some());
        assert!(record.name.is_none());
    }

    #[test]
    fn test_marker_without_environment_passes() {
        let record = classify("boussole ; python_version < \"2.7\"", None);
        assert_eq!(record.status, RequirementStatus::Parsed);
        assert!(record.marker.is_some());
    }

    #[test]
    fn test_marker_with_empty_environment_passes() {
        let environment = Environment::new();
        let record = classify("boussole ; python_version < \"2.7\"", Some(&environment));
        assert_eq!(record.status, RequirementStatus::Parsed);
    }

    #[test]
    fn test_marker_rejected_against_environment() {
        let environment = env(&[("python_version", "3.4")]);
        let record = classify("boussole ; python_version < \"2.7\"", Some(&environment));
        assert_eq!(record.status, RequirementStatus::MarkerReject);
        assert_eq!(record.name.as_deref(), Some("boussole"));
    }

    #[test]
    fn test_marker_satisfied_against_environment() {
        let environment = env(&[("python_version", "2.6")]);
        let record = classify("boussole ; python_version < \"2.7\"", Some(&environment));
        assert_eq!(record.status, RequirementStatus::Parsed);
    }

    #[test]
    fn test_surrounding_whitespace_is_stripped() {
        let record = classify("  django>=3.1  ", None);
        assert_eq!(record.source, "django>=3.1");
        assert_eq!(record.status, RequirementStatus::Parsed);
    }
}
