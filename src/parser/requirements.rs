//! Requirements document parser
//!
//! Walks a multi-line document, filters comments and blank lines, expands
//! `-r` inclusion directives in place and classifies everything else.
//! Inclusion paths resolve relative to the caller supplied base directory;
//! without a base directory an inclusion line falls through to the
//! classifier like any other pip flag.

use crate::domain::{Environment, RequirementRecord};
use crate::error::ParseError;
use crate::parser::line::classify;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Parse a requirements document into an ordered list of classified records.
///
/// A missing inclusion target fails the whole parse: splicing is positional,
/// so there is no meaningful partial result.
pub fn parse(
    document: &str,
    environment: Option<&Environment>,
    base_dir: Option<&Path>,
) -> Result<Vec<RequirementRecord>, ParseError> {
    let mut visited = HashSet::new();
    parse_lines(document, environment, base_dir, &mut visited)
}

fn parse_lines(
    document: &str,
    environment: Option<&Environment>,
    base_dir: Option<&Path>,
    visited: &mut HashSet<PathBuf>,
) -> Result<Vec<RequirementRecord>, ParseError> {
    let mut records = Vec::new();

    for line in document.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match base_dir {
            Some(base) if line.starts_with("-r ") => {
                let Some(target) = line.split_whitespace().nth(1) else {
                    continue;
                };
                let resolved = base.join(target);
                if !resolved.exists() {
                    return Err(ParseError::missing_included_source(resolved));
                }
                let canonical = fs::canonicalize(&resolved).unwrap_or_else(|_| resolved.clone());
                if !visited.insert(canonical.clone()) {
                    warn!("skipping circular inclusion: {}", resolved.display());
                    continue;
                }
                let nested = fs::read_to_string(&resolved)
                    .map_err(|error| ParseError::include_read(&resolved, error))?;
                records.extend(parse_lines(&nested, environment, base_dir, visited)?);
                visited.remove(&canonical);
            }
            _ => records.push(classify(line, environment)),
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RequirementStatus;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
diskette
-r dev.txt
# Niet
project-composer==0.7.0
django>3.1,<=3.2
foo>1,foo<=2
boussole ; python_version < \"2.7\"
";

    fn statuses(records: &[RequirementRecord]) -> Vec<(String, RequirementStatus)> {
        records
            .iter()
            .map(|record| (record.source.clone(), record.status))
            .collect()
    }

    #[test]
    fn test_round_trip_without_inclusions() {
        let records = parse(SAMPLE, None, None).unwrap();
        assert_eq!(
            statuses(&records),
            vec![
                ("diskette".to_string(), RequirementStatus::Parsed),
                ("-r dev.txt".to_string(), RequirementStatus::UnsupportedArgument),
                ("project-composer==0.7.0".to_string(), RequirementStatus::Parsed),
                ("django>3.1,<=3.2".to_string(), RequirementStatus::Parsed),
                ("foo>1,foo<=2".to_string(), RequirementStatus::Invalid),
                (
                    "boussole ; python_version < \"2.7\"".to_string(),
                    RequirementStatus::Parsed
                ),
            ]
        );
    }

    #[test]
    fn test_comments_and_blank_lines_are_dropped() {
        let records = parse("# only comments\n\n   \n# again\n", None, None).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_inclusion_is_spliced_in_place() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("dev.txt"), "pytest\nfreezegun\n").unwrap();

        let records = parse("django\n-r dev.txt\nrequests\n", None, Some(dir.path())).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(names, vec!["django", "pytest", "freezegun", "requests"]);
    }

    #[test]
    fn test_nested_inclusions_resolve_from_base_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("dev.txt"), "-r test.txt\npytest\n").unwrap();
        fs::write(dir.path().join("test.txt"), "tox\n").unwrap();

        let records = parse("-r dev.txt\n", None, Some(dir.path())).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(names, vec!["tox", "pytest"]);
    }

    #[test]
    fn test_missing_inclusion_fails_the_parse() {
        let dir = TempDir::new().unwrap();
        let error = parse("django\n-r nope.txt\n", None, Some(dir.path())).unwrap_err();
        match error {
            ParseError::MissingIncludedSource { path } => {
                assert!(path.ends_with("nope.txt"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_inclusion_without_base_dir_is_an_unsupported_argument() {
        let records = parse("-r dev.txt\n", None, None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, RequirementStatus::UnsupportedArgument);
    }

    #[test]
    fn test_circular_inclusion_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("base.txt"), "django\n-r dev.txt\n").unwrap();
        fs::write(dir.path().join("dev.txt"), "pytest\n-r base.txt\n").unwrap();

        let records = parse("-r base.txt\n", None, Some(dir.path())).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(names, vec!["django", "pytest"]);
    }

    #[test]
    fn test_diamond_inclusion_is_not_a_cycle() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("common.txt"), "six\n").unwrap();
        fs::write(dir.path().join("a.txt"), "-r common.txt\n").unwrap();
        fs::write(dir.path().join("b.txt"), "-r common.txt\n").unwrap();

        let records = parse("-r a.txt\n-r b.txt\n", None, Some(dir.path())).unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(names, vec!["six", "six"]);
    }
}
