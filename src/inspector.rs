//! Inspection pipeline
//!
//! Coordinates parse -> fetch -> resolve over a whole requirements
//! document. Requirements are processed one at a time, in document order;
//! a single package's registry failure is logged and that record keeps its
//! pre-resolution status, the batch continues. Optional chunking inserts a
//! pause between fixed-size groups of registry lookups to stay polite with
//! the registry rate limits; it never affects ordering or content.

use crate::domain::{Environment, RequirementRecord, RequirementStatus};
use crate::error::AppError;
use crate::lateness::LatenessResolver;
use crate::parser;
use crate::progress::Progress;
use crate::registry::PackageRegistry;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Default number of registry lookups per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 20;

/// Default pause between chunks
pub const DEFAULT_CHUNK_PAUSE: Duration = Duration::from_secs(1);

/// Pipeline orchestrating classification, registry fetches and resolution
pub struct Inspector {
    registry: Box<dyn PackageRegistry>,
    resolver: LatenessResolver,
    chunk_size: Option<usize>,
    chunk_pause: Option<Duration>,
    show_progress: bool,
}

impl Inspector {
    /// Create an inspector with default batching and no progress display
    pub fn new(registry: Box<dyn PackageRegistry>) -> Self {
        Self {
            registry,
            resolver: LatenessResolver::new(),
            chunk_size: Some(DEFAULT_CHUNK_SIZE),
            chunk_pause: Some(DEFAULT_CHUNK_PAUSE),
            show_progress: false,
        }
    }

    /// Configure chunking; `None` for either knob disables the pause
    pub fn with_batching(mut self, chunk_size: Option<usize>, pause: Option<Duration>) -> Self {
        self.chunk_size = chunk_size;
        self.chunk_pause = pause;
        self
    }

    /// Enable or disable the progress bar
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    /// Inspect a requirements document.
    ///
    /// Records come back in document order, inclusions spliced in place.
    /// With `strict` enabled, only records whose final status is `parsed`
    /// or `analyzed` are kept.
    pub async fn inspect(
        &self,
        document: &str,
        environment: Option<&Environment>,
        strict: bool,
        base_dir: Option<&Path>,
    ) -> Result<Vec<RequirementRecord>, AppError> {
        let records = parser::parse(document, environment, base_dir)?;

        let lookup_total = records
            .iter()
            .filter(|record| record.status == RequirementStatus::Parsed)
            .count();

        let mut progress = Progress::new(self.show_progress && lookup_total > 0);
        progress.start(lookup_total as u64, "Resolving requirements");

        let mut inspected = Vec::with_capacity(records.len());
        let mut lookups = 0usize;

        for record in records {
            if record.status != RequirementStatus::Parsed {
                inspected.push(record);
                continue;
            }

            if let (Some(chunk), Some(pause)) = (self.chunk_size, self.chunk_pause) {
                if lookups > 0 && lookups % chunk == 0 {
                    debug!("pausing {:?} between requirement chunks", pause);
                    tokio::time::sleep(pause).await;
                }
            }
            lookups += 1;

            let package = record.name.clone().unwrap_or_default();
            progress.set_message(&package);

            let outcome = match self.registry.fetch_snapshot(&package).await {
                Ok(snapshot) => match self.resolver.resolve(&record, &snapshot) {
                    Ok(resolved) => resolved,
                    Err(error) => {
                        warn!("leaving requirement '{}' unresolved: {}", record.source, error);
                        record
                    }
                },
                Err(error) => {
                    warn!(
                        "{} lookup failed for '{}': {}",
                        self.registry.registry_name(),
                        package,
                        error
                    );
                    record
                }
            };

            progress.inc();
            inspected.push(outcome);
        }

        progress.finish_and_clear();

        if strict {
            inspected.retain(|record| record.is_valid());
        }

        Ok(inspected)
    }
}
