//! Lateness resolution
//!
//! Takes a classified requirement and the registry snapshot for its package
//! and computes the resolved release, the latest release and the lateness
//! list. Only `parsed` records are eligible; everything else passes through
//! unchanged. The resolver never mutates its input: it returns a new record
//! and the caller decides what to keep, so a failing step leaves no partial
//! state behind.

mod release;

pub use release::{normalize_releases, parse_timestamp, Release};

use crate::domain::{RequirementRecord, RequirementStatus};
use crate::error::ResolveError;
use crate::registry::PackageSnapshot;
use crate::version;
use pep508_rs::pep440_rs::Version;
use std::str::FromStr;

/// Resolver for requirement lateness against registry snapshots
#[derive(Debug, Default)]
pub struct LatenessResolver;

impl LatenessResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve one requirement record against its package snapshot.
    ///
    /// `lateness` stays null when the requirement has no specifier or no
    /// release matched it; it is an empty list when the resolved release is
    /// already the newest final one. Both the registry declared latest
    /// version and the publish date of the numerically last release are
    /// recorded independently; they may disagree when the registry's own
    /// latest field is stale, and that divergence is kept as is.
    pub fn resolve(
        &self,
        record: &RequirementRecord,
        snapshot: &PackageSnapshot,
    ) -> Result<RequirementRecord, ResolveError> {
        if record.status != RequirementStatus::Parsed {
            return Ok(record.clone());
        }

        let package = record.name.as_deref().unwrap_or(snapshot.name.as_str());
        let mut resolved = record.clone();

        resolved.package_url = snapshot.package_url.clone();
        resolved.repository_url = snapshot.repository_url.clone();
        resolved.highest_version = Some(Version::from_str(&snapshot.latest_version).map_err(
            |_| ResolveError::InvalidLatestVersion {
                package: package.to_string(),
                version: snapshot.latest_version.clone(),
            },
        )?);

        let releases = normalize_releases(package, &snapshot.releases);

        if let Some(specifiers) = &record.specifier {
            let candidates = version::matches(specifiers, releases.iter().map(|r| &r.version));
            if let Some(best) = candidates.last().copied().cloned() {
                if let Some(release) = releases.iter().find(|r| r.version == best) {
                    resolved.resolved_version = Some(release.version.clone());
                    resolved.resolved_published = Some(release.published_at);
                }
            }
        }

        resolved.highest_published = releases.last().map(|release| release.published_at);

        if let Some(target) = resolved.resolved_version.clone() {
            let lateness = releases
                .iter()
                .filter(|release| release.version > target && version::is_final(&release.version))
                .map(|release| (release.version.to_string(), release.published_at))
                .collect();
            resolved.lateness = Some(lateness);
        }

        resolved.status = RequirementStatus::Analyzed;
        Ok(resolved)
    }
}
