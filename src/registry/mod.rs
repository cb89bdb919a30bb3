//! Package registry access
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - a narrow key-value cache store sitting in front of the fetches
//! - the PyPI gateway (detail endpoint + Simple release listing)

mod cache;
mod client;
mod pypi;

pub use cache::{CacheStore, FileCache, MemoryCache};
pub use client::HttpClient;
pub use pypi::{PypiRegistry, PYPI_BASE_URL};

use crate::error::RegistryError;
use async_trait::async_trait;

/// Raw fetched-or-cached metadata for one package name.
///
/// Owned transiently per request; release tuples are kept as plain strings,
/// type coercion belongs to the lateness resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSnapshot {
    /// Canonical package name as reported by the registry
    pub name: String,
    /// Package page URL
    pub package_url: Option<String>,
    /// Repository URL, when the project metadata exposes one
    pub repository_url: Option<String>,
    /// Latest version as declared by the registry, not derived from releases
    pub latest_version: String,
    /// Unordered release tuples (version string, publish timestamp string)
    pub releases: Vec<ReleaseEntry>,
}

/// One raw release tuple from the registry listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseEntry {
    pub version: String,
    pub published_at: String,
}

impl ReleaseEntry {
    pub fn new(version: impl Into<String>, published_at: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            published_at: published_at.into(),
        }
    }
}

/// Trait for package registries
#[async_trait]
pub trait PackageRegistry: Send + Sync {
    /// Get the registry name used in logs and error messages
    fn registry_name(&self) -> &'static str;

    /// Fetch the merged metadata snapshot for a package
    async fn fetch_snapshot(&self, package: &str) -> Result<PackageSnapshot, RegistryError>;
}
