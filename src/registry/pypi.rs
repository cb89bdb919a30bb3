//! PyPI gateway
//!
//! Two endpoints are needed per package: the JSON API detail endpoint for
//! URLs and the declared latest version, and the Simple (Legacy) API for
//! the release listing. Both go through the cache-first policy: an existing
//! cache entry is returned verbatim without any network call, a miss
//! fetches and then persists the raw successful response.
//!
//! The Simple API has no per-release version field with a date; the version
//! number is extracted from sdist tarball filenames, which are standardized
//! enough for that to be reliable. Wheels and other files are ignored.

use crate::error::RegistryError;
use crate::registry::{CacheStore, HttpClient, PackageRegistry, PackageSnapshot, ReleaseEntry};
use async_trait::async_trait;
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Public PyPI base URL
pub const PYPI_BASE_URL: &str = "https://pypi.org";

const REGISTRY_NAME: &str = "PyPI";

/// Accept header required by the Simple API to answer with JSON; the JSON
/// API ignores it.
const SIMPLE_ACCEPT: &str = "application/vnd.pypi.simple.v1+json";

/// `project_urls` keys eligible as a repository URL, lowercase
const REPOSITORY_URL_NAMES: [&str; 3] = ["repository", "source", "source code"];

/// PyPI gateway with optional response cache
pub struct PypiRegistry {
    client: HttpClient,
    cache: Option<Box<dyn CacheStore>>,
    base_url: String,
}

/// JSON API package detail payload
#[derive(Debug, Deserialize)]
struct DetailPayload {
    info: DetailInfo,
}

#[derive(Debug, Deserialize)]
struct DetailInfo {
    name: String,
    /// Latest version as declared by the registry
    version: String,
    package_url: Option<String>,
    /// Not normalized enough to address directly, scanned by key name
    project_urls: Option<IndexMap<String, Option<String>>>,
}

/// Simple API release listing payload
#[derive(Debug, Deserialize)]
struct ReleasesPayload {
    files: Vec<ReleaseFile>,
}

#[derive(Debug, Deserialize)]
struct ReleaseFile {
    filename: String,
    #[serde(rename = "upload-time")]
    upload_time: Option<String>,
}

impl PypiRegistry {
    /// Create a gateway against the public PyPI
    pub fn new(client: HttpClient) -> Self {
        Self::with_base_url(client, PYPI_BASE_URL)
    }

    /// Create a gateway against a custom base URL (used by tests)
    pub fn with_base_url(client: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            cache: None,
            base_url: base_url.into(),
        }
    }

    /// Attach a cache store in front of the fetches
    pub fn with_cache(mut self, cache: Box<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    fn detail_url(&self, package: &str) -> String {
        format!("{}/pypi/{}/json", self.base_url, package)
    }

    fn releases_url(&self, package: &str) -> String {
        format!("{}/simple/{}/", self.base_url, package)
    }

    /// Cache-first payload retrieval for one endpoint
    async fn cached_payload(
        &self,
        package: &str,
        key: &str,
        url: &str,
        accept: Option<&str>,
    ) -> Result<String, RegistryError> {
        if let Some(cache) = &self.cache {
            if let Some(payload) = cache.get(key) {
                debug!("loading '{}' data from cache entry {}", package, key);
                return Ok(payload);
            }
        }

        let payload = self
            .client
            .get_text(url, accept, package, REGISTRY_NAME)
            .await?;
        debug!("fetched {}", url);

        if let Some(cache) = &self.cache {
            if let Err(error) = cache.put(key, &payload) {
                warn!("failed to write cache entry {}: {}", key, error);
            }
        }

        Ok(payload)
    }

    async fn fetch_detail(&self, package: &str) -> Result<DetailPayload, RegistryError> {
        let payload = self
            .cached_payload(
                package,
                &format!("{}.detail.json", package),
                &self.detail_url(package),
                None,
            )
            .await?;

        serde_json::from_str(&payload)
            .map_err(|error| RegistryError::invalid_response(package, REGISTRY_NAME, error.to_string()))
    }

    async fn fetch_releases(&self, package: &str) -> Result<ReleasesPayload, RegistryError> {
        let payload = self
            .cached_payload(
                package,
                &format!("{}.releases.json", package),
                &self.releases_url(package),
                Some(SIMPLE_ACCEPT),
            )
            .await?;

        serde_json::from_str(&payload)
            .map_err(|error| RegistryError::invalid_response(package, REGISTRY_NAME, error.to_string()))
    }
}

#[async_trait]
impl PackageRegistry for PypiRegistry {
    fn registry_name(&self) -> &'static str {
        REGISTRY_NAME
    }

    async fn fetch_snapshot(&self, package: &str) -> Result<PackageSnapshot, RegistryError> {
        if package.trim().is_empty() {
            return Err(RegistryError::EmptyPackageName);
        }

        let detail = self.fetch_detail(package).await?;
        let releases = self.fetch_releases(package).await?;

        let release_entries = releases
            .files
            .iter()
            .filter(|file| file.filename.ends_with(".tar.gz"))
            .filter_map(|file| {
                let version = sdist_version(&file.filename)?;
                let published_at = file.upload_time.clone()?;
                Some(ReleaseEntry::new(version, published_at))
            })
            .collect();

        let repository_url = repository_url(&detail.info);
        Ok(PackageSnapshot {
            name: detail.info.name,
            package_url: detail.info.package_url,
            repository_url,
            latest_version: detail.info.version,
            releases: release_entries,
        })
    }
}

/// Extract the version number from an sdist tarball filename.
///
/// Some tarballs carry a `-reupload` marker added by the registry itself,
/// which is not part of the version number.
fn sdist_version(filename: &str) -> Option<String> {
    static SDIST_VERSION: OnceLock<Regex> = OnceLock::new();
    let pattern = SDIST_VERSION
        .get_or_init(|| Regex::new(r"-([^-]+)\.tar\.gz$").expect("valid sdist pattern"));

    let cleaned = filename.replace("-reupload", "");
    pattern
        .captures(&cleaned)
        .map(|captures| captures[1].to_string())
}

/// Pick a repository URL from the loosely structured `project_urls` mapping
fn repository_url(info: &DetailInfo) -> Option<String> {
    let urls = info.project_urls.as_ref()?;
    urls.iter()
        .find(|(name, value)| {
            value.is_some() && REPOSITORY_URL_NAMES.contains(&name.to_lowercase().as_str())
        })
        .and_then(|(_, value)| value.clone())
}
