//! Batch rename engine with bounded concurrency.
//!
//! The engine discovers candidates under a root, then runs one
//! [`RenameWorker`] task per file. A semaphore bounds how many files are in
//! flight; the registry client additionally bounds in-flight requests per host.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use renamer_core::{RenameConfig, RenameEngine};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = RenameEngine::new(RenameConfig::default())?;
//! let report = engine.run(Path::new("./papers")).await?;
//! println!("renamed {} of {}", report.renamed(), report.total());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument};

use super::worker::{FileError, FileOutcome, RenameWorker, TargetClaims};
use crate::discovery::{DiscoveryError, DiscoveryOptions, discover_pdfs};
use crate::extract::{DEFAULT_PAGES, LopdfExtractor, TextExtractor};
use crate::resolver::{CrossrefClient, HttpSettings, MetadataSource, ResolveError};

/// Minimum allowed concurrency value.
const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
const MAX_CONCURRENCY: usize = 100;

/// Default concurrency if not specified.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Minimum pages scanned per document.
const MIN_PAGES: usize = 1;

/// Maximum pages scanned per document.
const MAX_PAGES: usize = 20;

/// Error type for batch engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Invalid page count provided.
    #[error("invalid page count {value}: must be between {MIN_PAGES} and {MAX_PAGES}")]
    InvalidPages {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Invalid per-host connection limit.
    #[error("invalid per-host connection limit {value}: must be at least 1")]
    InvalidPerHostConnections {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Candidate discovery failed before any file was processed.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// The registry client could not be constructed.
    #[error(transparent)]
    Resolver(#[from] ResolveError),

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// Everything a batch run needs, passed by value into the engine.
#[derive(Debug, Clone)]
pub struct RenameConfig {
    /// Maximum files processed at once.
    pub concurrency: usize,
    /// Leading pages scanned for a DOI.
    pub pages: usize,
    /// Report planned renames without touching the filesystem.
    pub dry_run: bool,
    /// Which files discovery collects.
    pub discovery: DiscoveryOptions,
    /// Registry client settings.
    pub http: HttpSettings,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            pages: DEFAULT_PAGES,
            dry_run: false,
            discovery: DiscoveryOptions::default(),
            http: HttpSettings::default(),
        }
    }
}

impl RenameConfig {
    /// Checks numeric settings against their allowed ranges.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range setting as an [`EngineError`].
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(EngineError::InvalidConcurrency {
                value: self.concurrency,
            });
        }
        if !(MIN_PAGES..=MAX_PAGES).contains(&self.pages) {
            return Err(EngineError::InvalidPages { value: self.pages });
        }
        if self.http.per_host_connections == 0 {
            return Err(EngineError::InvalidPerHostConnections {
                value: self.http.per_host_connections,
            });
        }
        Ok(())
    }
}

/// Per-file outcomes of one batch plus its wall-clock duration.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One outcome per discovered file, in completion order.
    pub outcomes: Vec<FileOutcome>,
    /// Time from discovery start to the last worker finishing.
    pub elapsed: Duration,
}

impl BatchReport {
    /// Files renamed on disk.
    #[must_use]
    pub fn renamed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Renamed { .. }))
    }

    /// Files that would have been renamed in a dry run.
    #[must_use]
    pub fn planned(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Planned { .. }))
    }

    /// Files left untouched without an error.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped { .. }))
    }

    /// Files whose processing failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    /// All files processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Runs rename workers over every PDF under a root.
pub struct RenameEngine {
    config: RenameConfig,
    source: Arc<dyn MetadataSource>,
    extractor: Arc<dyn TextExtractor>,
}

impl std::fmt::Debug for RenameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenameEngine")
            .field("config", &self.config)
            .field("source", &self.source.name())
            .finish_non_exhaustive()
    }
}

impl RenameEngine {
    /// Creates an engine backed by the public Crossref API and lopdf.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the config is out of range or the HTTP
    /// client cannot be built.
    pub fn new(config: RenameConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let source = CrossrefClient::new(&config.http)?;
        Ok(Self::from_parts(
            config,
            Arc::new(source),
            Arc::new(LopdfExtractor::new()),
        ))
    }

    /// Creates an engine with caller-supplied metadata source and extractor.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the config is out of range.
    pub fn with_components(
        config: RenameConfig,
        source: Arc<dyn MetadataSource>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self::from_parts(config, source, extractor))
    }

    fn from_parts(
        config: RenameConfig,
        source: Arc<dyn MetadataSource>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        debug!(
            concurrency = config.concurrency,
            pages = config.pages,
            dry_run = config.dry_run,
            source = source.name(),
            "creating rename engine"
        );
        Self {
            config,
            source,
            extractor,
        }
    }

    /// Returns the engine's configuration.
    #[must_use]
    pub fn config(&self) -> &RenameConfig {
        &self.config
    }

    /// Discovers PDFs under `root` and processes them concurrently.
    ///
    /// Returns once every worker has finished.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Discovery`] if the root cannot be read.
    /// Individual file failures do NOT cause this method to error; they are
    /// recorded in the report.
    #[instrument(skip(self), fields(root = %root.display()))]
    pub async fn run(&self, root: &Path) -> Result<BatchReport, EngineError> {
        let started = Instant::now();
        let candidates = discover_pdfs(root, self.config.discovery)?;
        info!(files = candidates.len(), "starting batch");

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let claims = Arc::new(TargetClaims::default());
        let worker = RenameWorker::with_claims(
            Arc::clone(&self.source),
            Arc::clone(&self.extractor),
            claims,
            self.config.pages,
            self.config.dry_run,
        );

        let mut tasks = JoinSet::new();
        let mut paths: HashMap<tokio::task::Id, PathBuf> = HashMap::new();
        let mut outcomes = Vec::with_capacity(candidates.len());

        for candidate in candidates.into_values() {
            // Acquire permit before spawning (backpressure)
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|_| EngineError::SemaphoreClosed)?;

            let worker = worker.clone();
            let path = candidate.path.clone();
            let handle = tasks.spawn(async move {
                let _permit = permit;
                match AssertUnwindSafe(worker.process(&candidate))
                    .catch_unwind()
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(payload) => {
                        let reason = panic_message(payload.as_ref());
                        error!(path = %candidate.path.display(), %reason, "worker panicked");
                        FileOutcome::Failed {
                            path: candidate.path.clone(),
                            error: FileError::TaskAborted { reason },
                        }
                    }
                }
            });
            paths.insert(handle.id(), path);

            // Drain finished tasks so outcomes do not pile up in the set
            while let Some(joined) = tasks.try_join_next_with_id() {
                outcomes.push(outcome_from_join(joined, &paths));
            }
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            outcomes.push(outcome_from_join(joined, &paths));
        }

        let report = BatchReport {
            outcomes,
            elapsed: started.elapsed(),
        };
        info!(
            total = report.total(),
            renamed = report.renamed(),
            planned = report.planned(),
            skipped = report.skipped(),
            failed = report.failed(),
            elapsed_ms = report.elapsed.as_millis(),
            "batch complete"
        );
        Ok(report)
    }
}

fn outcome_from_join(
    joined: Result<(tokio::task::Id, FileOutcome), tokio::task::JoinError>,
    paths: &HashMap<tokio::task::Id, PathBuf>,
) -> FileOutcome {
    match joined {
        Ok((_, outcome)) => outcome,
        Err(join_error) => {
            let path = paths.get(&join_error.id()).cloned().unwrap_or_default();
            error!(path = %path.display(), error = %join_error, "worker task aborted");
            FileOutcome::Failed {
                path,
                error: FileError::TaskAborted {
                    reason: join_error.to_string(),
                },
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
