//! Version ordering and specifier matching policy
//!
//! Version parsing, total ordering and specifier evaluation come from
//! `pep440_rs`. This module owns the two policies layered on top of it:
//! the final-release predicate used by lateness computation, and the
//! prerelease exclusion rule used when matching specifiers against the
//! available releases of a package.

use pep508_rs::pep440_rs::{Version, VersionSpecifiers};

/// A final release is not a prerelease, a postrelease or a dev release.
pub fn is_final(version: &Version) -> bool {
    version.pre().is_none() && version.post().is_none() && version.dev().is_none()
}

/// Prerelease candidates only participate in specifier matching when one of
/// the specifiers pins a prerelease version itself.
pub fn allows_prereleases(specifiers: &VersionSpecifiers) -> bool {
    specifiers.iter().any(|s| s.version().any_prerelease())
}

/// Filter candidate versions down to the subset admitted by the specifiers,
/// applying the prerelease policy. Input order is preserved, so feeding an
/// ascending-sorted list keeps the maximum candidate last.
pub fn matches<'a, I>(specifiers: &VersionSpecifiers, candidates: I) -> Vec<&'a Version>
where
    I: IntoIterator<Item = &'a Version>,
{
    let allow_prereleases = allows_prereleases(specifiers);
    candidates
        .into_iter()
        .filter(|candidate| {
            (allow_prereleases || !candidate.any_prerelease()) && specifiers.contains(candidate)
        })
        .collect()
}
