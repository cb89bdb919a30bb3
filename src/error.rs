//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ParseError: structural failures while walking a requirements document
//! - RegistryError: issues with package registry communication
//! - ResolveError: issues while computing lateness from registry data
//!
//! Per-line syntax issues are never errors, they are terminal statuses on
//! the requirement record itself (see `domain::RequirementStatus`).

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Requirements document related errors
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Package registry related errors
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Lateness resolution related errors
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Errors related to requirements document parsing
///
/// These are fatal to the whole parse: a broken inclusion means the line
/// ordering of the output would be undefined, so there is no partial result.
#[derive(Error, Debug)]
pub enum ParseError {
    /// An inclusion directive points to a file that does not exist
    #[error("unable to find included source: {path}")]
    MissingIncludedSource { path: PathBuf },

    /// An inclusion target exists but could not be read
    #[error("failed to read included source {path}: {source}")]
    IncludeRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to package registry communication
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Package not found in registry
    #[error("package '{package}' not found on {registry}")]
    PackageNotFound { package: String, registry: String },

    /// Registry rejected the request as forbidden
    #[error("authentication rejected by {registry}: {message}")]
    AuthFailed { registry: String, message: String },

    /// Rate limit exceeded
    #[error("rate limit exceeded for {registry}")]
    RateLimited { registry: String },

    /// Network request failed with a non-success status or transport error
    #[error("request for '{package}' to {registry} failed: {message}")]
    RequestFailed {
        package: String,
        registry: String,
        message: String,
    },

    /// Response body could not be decoded
    #[error("invalid response from {registry} for '{package}': {message}")]
    InvalidResponse {
        package: String,
        registry: String,
        message: String,
    },

    /// Timeout
    #[error("timeout while fetching '{package}' from {registry}")]
    Timeout { package: String, registry: String },

    /// Rejected before any I/O happens
    #[error("package without a name can not be requested")]
    EmptyPackageName,
}

/// Errors related to lateness resolution
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The registry declared latest version does not parse
    #[error("package '{package}' latest version '{version}' is not a valid version number")]
    InvalidLatestVersion { package: String, version: String },
}

impl ParseError {
    /// Creates a new MissingIncludedSource error
    pub fn missing_included_source(path: impl Into<PathBuf>) -> Self {
        ParseError::MissingIncludedSource { path: path.into() }
    }

    /// Creates a new IncludeRead error
    pub fn include_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ParseError::IncludeRead {
            path: path.into(),
            source,
        }
    }
}

impl RegistryError {
    /// Creates a new PackageNotFound error
    pub fn package_not_found(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::PackageNotFound {
            package: package.into(),
            registry: registry.into(),
        }
    }

    /// Creates a new AuthFailed error
    pub fn auth_failed(registry: impl Into<String>, message: impl Into<String>) -> Self {
        RegistryError::AuthFailed {
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new RateLimited error
    pub fn rate_limited(registry: impl Into<String>) -> Self {
        RegistryError::RateLimited {
            registry: registry.into(),
        }
    }

    /// Creates a new RequestFailed error
    pub fn request_failed(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::RequestFailed {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(
        package: impl Into<String>,
        registry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        RegistryError::InvalidResponse {
            package: package.into(),
            registry: registry.into(),
            message: message.into(),
        }
    }

    /// Creates a new Timeout error
    pub fn timeout(package: impl Into<String>, registry: impl Into<String>) -> Self {
        RegistryError::Timeout {
            package: package.into(),
            registry: registry.into(),
        }
    }
}
