//! Normalized release information
//!
//! Registry release tuples arrive as plain strings; this module coerces
//! them into a typed, ascending-sorted list. Entries with an unreadable
//! version number or publish date are dropped with a warning, never fatal.

use crate::registry::ReleaseEntry;
use chrono::{DateTime, NaiveDateTime, Utc};
use pep508_rs::pep440_rs::Version;
use std::str::FromStr;
use tracing::warn;

/// A release tuple after type coercion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub version: Version,
    pub published_at: DateTime<Utc>,
}

impl Release {
    pub fn new(version: Version, published_at: DateTime<Utc>) -> Self {
        Self {
            version,
            published_at,
        }
    }
}

/// Parse a registry publish timestamp.
///
/// PyPI emits two shapes, with and without sub-second precision, both UTC:
/// `2022-10-29T14:15:57.755859Z` and `2022-10-29T14:15:57Z`. A bare
/// datetime without the `Z` suffix is tolerated and read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Coerce raw release tuples into an ascending-sorted release list.
///
/// The sort is stable, so entries with equal versions keep their original
/// relative order.
pub fn normalize_releases(package: &str, entries: &[ReleaseEntry]) -> Vec<Release> {
    let mut releases = Vec::with_capacity(entries.len());

    for entry in entries {
        let Some(published_at) = parse_timestamp(&entry.published_at) else {
            warn!(
                "Ignored package '{}' release '{}' with unreadable publish date '{}'",
                package, entry.version, entry.published_at
            );
            continue;
        };

        match Version::from_str(&entry.version) {
            Ok(version) => releases.push(Release::new(version, published_at)),
            Err(_) => {
                warn!(
                    "Ignored package '{}' invalid release version number '{}'",
                    package, entry.version
                );
            }
        }
    }

    releases.sort_by(|a, b| a.version.cmp(&b.version));
    releases
}
