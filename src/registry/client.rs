//! HTTP client shared foundation
//!
//! Wraps `reqwest` with:
//! - configurable timeout and User-Agent
//! - exponential backoff retry logic (max 3 retries)
//! - status code mapping to the registry error taxonomy

use crate::error::RegistryError;
use reqwest::Client;
use std::time::Duration;

/// Default timeout for HTTP requests (15 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("deplag/", env!("CARGO_PKG_VERSION"));

/// Maximum number of retry attempts
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_config(Some(DEFAULT_TIMEOUT), DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration.
    ///
    /// A `None` timeout disables the per-request deadline entirely.
    pub fn with_config(timeout: Option<Duration>, user_agent: &str) -> Result<Self, RegistryError> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|error| {
            RegistryError::request_failed(
                "",
                "HTTP client",
                format!("failed to create HTTP client: {}", error),
            )
        })?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Perform a GET request with retry logic and error context.
    ///
    /// `accept` sets an explicit Accept header; the PyPI Simple API needs
    /// `application/vnd.pypi.simple.v1+json` to answer with JSON.
    pub async fn get_with_context(
        &self,
        url: &str,
        accept: Option<&str>,
        package: &str,
        registry: &str,
    ) -> Result<reqwest::Response, RegistryError> {
        let mut last_error = None;
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=self.max_retries {
            let mut request = self.client.get(url);
            if let Some(accept) = accept {
                request = request.header(reqwest::header::ACCEPT, accept);
            }

            match request.send().await {
                Ok(response) => {
                    // 429 is retried with backoff before giving up
                    if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(RegistryError::rate_limited(registry));

                        if attempt < self.max_retries {
                            tokio::time::sleep(Duration::from_millis(delay)).await;
                            delay *= 2;
                            continue;
                        } else {
                            break;
                        }
                    }

                    if response.status() == reqwest::StatusCode::NOT_FOUND {
                        return Err(RegistryError::package_not_found(package, registry));
                    }

                    if response.status() == reqwest::StatusCode::FORBIDDEN {
                        return Err(RegistryError::auth_failed(
                            registry,
                            format!("HTTP {}", response.status()),
                        ));
                    }

                    if !response.status().is_success() {
                        return Err(RegistryError::request_failed(
                            package,
                            registry,
                            format!("HTTP {}", response.status()),
                        ));
                    }

                    return Ok(response);
                }
                Err(error) => {
                    if error.is_timeout() {
                        last_error = Some(RegistryError::timeout(package, registry));
                    } else {
                        last_error = Some(RegistryError::request_failed(
                            package,
                            registry,
                            error.to_string(),
                        ));
                    }

                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        delay *= 2;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| RegistryError::request_failed(package, registry, "unknown error")))
    }

    /// Perform a GET request and return the raw body text
    pub async fn get_text(
        &self,
        url: &str,
        accept: Option<&str>,
        package: &str,
        registry: &str,
    ) -> Result<String, RegistryError> {
        let response = self.get_with_context(url, accept, package, registry).await?;

        response.text().await.map_err(|error| {
            RegistryError::invalid_response(
                package,
                registry,
                format!("failed to read response body: {}", error),
            )
        })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new().expect("failed to create default HTTP client")
    }
}
