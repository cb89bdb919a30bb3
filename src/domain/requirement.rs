//! Requirement record and its status state machine

use chrono::{DateTime, Utc};
use pep508_rs::pep440_rs::{Version, VersionSpecifiers};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal status of a requirement line
///
/// A record is created by the classifier in one of the parse states and may
/// be moved exactly once, by the lateness resolver, from `Parsed` to
/// `Analyzed`. No status ever transitions backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequirementStatus {
    /// Requirement has been properly parsed as supported syntax
    Parsed,
    /// Requirement has been parsed and resolved against the registry
    Analyzed,
    /// Unsupported pip argument, parsing aborted
    UnsupportedArgument,
    /// Unsupported local path to a package, parsing aborted
    UnsupportedLocalpath,
    /// Unsupported direct package URL, parsing aborted
    UnsupportedUrl,
    /// Invalid requirement syntax, computation aborted
    Invalid,
    /// Marker did not match the given environment, computation aborted
    MarkerReject,
}

impl RequirementStatus {
    /// Human label used by the failure tables
    pub fn label(&self) -> &'static str {
        match self {
            RequirementStatus::Parsed => "Parsed requirement syntax",
            RequirementStatus::Analyzed => "Analyzed package informations",
            RequirementStatus::UnsupportedArgument => "Unsupported Pip argument",
            RequirementStatus::UnsupportedLocalpath => "Local package is not supported",
            RequirementStatus::UnsupportedUrl => "Direct package URL is not supported",
            RequirementStatus::Invalid => "Invalid syntax",
            RequirementStatus::MarkerReject => {
                "Rejected by marker evaluation against given environment"
            }
        }
    }

    /// True for requirements that are at least syntactically acceptable
    pub fn is_valid(&self) -> bool {
        matches!(self, RequirementStatus::Parsed | RequirementStatus::Analyzed)
    }
}

impl fmt::Display for RequirementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequirementStatus::Parsed => "parsed",
            RequirementStatus::Analyzed => "analyzed",
            RequirementStatus::UnsupportedArgument => "unsupported-argument",
            RequirementStatus::UnsupportedLocalpath => "unsupported-localpath",
            RequirementStatus::UnsupportedUrl => "unsupported-url",
            RequirementStatus::Invalid => "invalid",
            RequirementStatus::MarkerReject => "marker-reject",
        };
        write!(f, "{}", name)
    }
}

/// One line of a requirements document with everything computed about it
///
/// Every field is always present and null-valued when inapplicable, so a
/// single record type covers all statuses and serializes uniformly.
/// `lateness` distinguishes null (no specifier, lateness inapplicable) from
/// an empty list (specifier given, resolved version is current).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementRecord {
    /// Raw requirement line, stripped of surrounding whitespace
    pub source: String,
    /// Terminal status from classification, then possibly resolution
    pub status: RequirementStatus,
    /// Package name parsed from the source
    #[serde(default)]
    pub name: Option<String>,
    /// Version specifiers parsed from the source
    #[serde(default, with = "specifiers_string")]
    pub specifier: Option<VersionSpecifiers>,
    /// Marker expression text parsed from the source
    #[serde(default)]
    pub marker: Option<String>,
    /// Extras parsed from the source
    #[serde(default)]
    pub extras: Vec<String>,
    /// Direct reference URL parsed from the source (`pkg @ https://...`)
    #[serde(default)]
    pub url: Option<String>,
    /// Package page URL collected from the registry
    #[serde(default)]
    pub package_url: Option<String>,
    /// Repository URL collected from the registry
    #[serde(default)]
    pub repository_url: Option<String>,
    /// Highest release satisfying the specifiers, when any matched
    #[serde(default, with = "version_string")]
    pub resolved_version: Option<Version>,
    /// Publish date of the resolved release
    #[serde(default)]
    pub resolved_published: Option<DateTime<Utc>>,
    /// Latest version as declared by the registry detail payload
    #[serde(default, with = "version_string")]
    pub highest_version: Option<Version>,
    /// Publish date of the numerically last known release
    #[serde(default)]
    pub highest_published: Option<DateTime<Utc>>,
    /// Final releases strictly newer than the resolved one, ascending
    #[serde(default)]
    pub lateness: Option<Vec<(String, DateTime<Utc>)>>,
    /// Diagnostic from the grammar parser when status is `invalid`
    #[serde(default)]
    pub parse_error: Option<String>,
}

impl RequirementRecord {
    /// Create a record with every detail unset
    pub fn new(source: impl Into<String>, status: RequirementStatus) -> Self {
        Self {
            source: source.into(),
            status,
            name: None,
            specifier: None,
            marker: None,
            extras: Vec::new(),
            url: None,
            package_url: None,
            repository_url: None,
            resolved_version: None,
            resolved_published: None,
            highest_version: None,
            highest_published: None,
            lateness: None,
            parse_error: None,
        }
    }

    /// True for requirements that are at least syntactically acceptable
    pub fn is_valid(&self) -> bool {
        self.status.is_valid()
    }
}

impl fmt::Display for RequirementRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status, self.source)
    }
}

/// Serialize an optional `Version` as its canonical string form
mod version_string {
    use pep508_rs::pep440_rs::Version;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(
        value: &Option<Version>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(version) => serializer.serialize_some(&version.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Version>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.filter(|content| !content.is_empty())
            .map(|content| Version::from_str(&content).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Serialize optional `VersionSpecifiers` as their canonical string form
mod specifiers_string {
    use pep508_rs::pep440_rs::VersionSpecifiers;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(
        value: &Option<VersionSpecifiers>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(specifiers) => serializer.serialize_some(&specifiers.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<VersionSpecifiers>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.filter(|content| !content.is_empty())
            .map(|content| VersionSpecifiers::from_str(&content).map_err(serde::de::Error::custom))
            .transpose()
    }
}
