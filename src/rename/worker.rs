//! Per-file rename worker.
//!
//! `extract-text -> find-doi -> lookup -> compute-name -> collision-check ->
//! rename`. Every step's failure is captured in the returned
//! [`FileOutcome`]; nothing propagates to sibling workers, and the original
//! file is untouched unless the final rename succeeds.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use super::filename::build_target_filename;
use crate::discovery::CandidateFile;
use crate::extract::{ExtractError, TextExtractor, extract_blocking};
use crate::parser::{find_doi, normalize_whitespace};
use crate::resolver::{MetadataSource, Resolution, ResolveError, resolve_metadata};

/// Why a file was left as-is without an error.
#[derive(Debug, Clone)]
pub enum SkipReason {
    /// Metadata could not be resolved.
    Resolution(ResolveError),
    /// A file already exists at the target path (or another worker claimed it).
    Collision {
        /// The path that was taken.
        target: PathBuf,
    },
    /// The file already carries its target name.
    AlreadyNamed,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolution(e) => write!(f, "{e}"),
            Self::Collision { target } => write!(f, "target exists: {}", target.display()),
            Self::AlreadyNamed => f.write_str("already named"),
        }
    }
}

/// Per-file failures.
#[derive(Debug, Error)]
pub enum FileError {
    /// Text could not be extracted from the PDF.
    #[error(transparent)]
    Extraction(#[from] ExtractError),

    /// The filesystem rename (or the pre-rename existence check) failed.
    #[error("cannot rename to {target}: {source}")]
    Rename {
        /// The intended target path.
        target: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The worker task panicked or was cancelled.
    #[error("worker task aborted: {reason}")]
    TaskAborted {
        /// Panic payload or cancellation reason.
        reason: String,
    },
}

/// Terminal state of one worker.
#[derive(Debug)]
pub enum FileOutcome {
    /// The file was renamed.
    Renamed {
        /// Original path.
        from: PathBuf,
        /// New path.
        to: PathBuf,
    },
    /// Dry run: the file would have been renamed.
    Planned {
        /// Original path.
        from: PathBuf,
        /// Path it would be renamed to.
        to: PathBuf,
    },
    /// The file was intentionally left alone.
    Skipped {
        /// The file's path.
        path: PathBuf,
        /// Why it was skipped.
        reason: SkipReason,
    },
    /// Processing failed.
    Failed {
        /// The file's path.
        path: PathBuf,
        /// What failed.
        error: FileError,
    },
}

impl FileOutcome {
    /// Returns the path of the file this outcome belongs to (its original path).
    #[must_use]
    pub fn source_path(&self) -> &Path {
        match self {
            Self::Renamed { from, .. } | Self::Planned { from, .. } => from,
            Self::Skipped { path, .. } | Self::Failed { path, .. } => path,
        }
    }
}

/// Target paths claimed by in-flight renames in one batch.
///
/// Two workers that resolve to the same target both see "does not exist" on
/// disk until one renames; the claim set makes the first claimant the only
/// one allowed to proceed.
#[derive(Debug, Default)]
pub(crate) struct TargetClaims {
    claimed: Mutex<HashSet<PathBuf>>,
}

impl TargetClaims {
    /// Claims `target`; returns false if another worker already holds it.
    fn claim(&self, target: &Path) -> bool {
        match self.claimed.lock() {
            Ok(mut set) => set.insert(target.to_path_buf()),
            Err(poisoned) => poisoned.into_inner().insert(target.to_path_buf()),
        }
    }

    /// Releases a claim after a failed rename so the path is not held forever.
    fn release(&self, target: &Path) {
        match self.claimed.lock() {
            Ok(mut set) => set.remove(target),
            Err(poisoned) => poisoned.into_inner().remove(target),
        };
    }
}

/// Processes one candidate file end to end.
#[derive(Clone)]
pub struct RenameWorker {
    source: Arc<dyn MetadataSource>,
    extractor: Arc<dyn TextExtractor>,
    claims: Arc<TargetClaims>,
    pages: usize,
    dry_run: bool,
}

impl std::fmt::Debug for RenameWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenameWorker")
            .field("source", &self.source.name())
            .field("pages", &self.pages)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl RenameWorker {
    /// Creates a worker with its own claim set.
    ///
    /// Workers that may race on the same directory must share claims; the
    /// batch engine builds them through [`RenameWorker::with_claims`].
    #[must_use]
    pub fn new(
        source: Arc<dyn MetadataSource>,
        extractor: Arc<dyn TextExtractor>,
        pages: usize,
        dry_run: bool,
    ) -> Self {
        Self::with_claims(source, extractor, Arc::default(), pages, dry_run)
    }

    pub(crate) fn with_claims(
        source: Arc<dyn MetadataSource>,
        extractor: Arc<dyn TextExtractor>,
        claims: Arc<TargetClaims>,
        pages: usize,
        dry_run: bool,
    ) -> Self {
        Self {
            source,
            extractor,
            claims,
            pages,
            dry_run,
        }
    }

    /// Runs the full pipeline for `candidate`.
    #[instrument(skip(self, candidate), fields(file = %candidate.file_name))]
    pub async fn process(&self, candidate: &CandidateFile) -> FileOutcome {
        info!(path = %candidate.path.display(), "processing");

        let raw_text =
            match extract_blocking(Arc::clone(&self.extractor), candidate.path.clone(), self.pages)
                .await
            {
                Ok(text) => text,
                Err(e) => {
                    error!(error = %e, "text extraction failed");
                    return FileOutcome::Failed {
                        path: candidate.path.clone(),
                        error: FileError::Extraction(e),
                    };
                }
            };

        let doi = find_doi(&normalize_whitespace(&raw_text));
        if doi.is_none() {
            info!("no DOI found; falling back to title search");
        }

        let resolved = match resolve_metadata(self.source.as_ref(), doi.as_deref(), &raw_text).await
        {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!(error = %e, "metadata resolution failed; skipping");
                return FileOutcome::Skipped {
                    path: candidate.path.clone(),
                    reason: SkipReason::Resolution(e),
                };
            }
        };
        match &resolved.via {
            Resolution::Doi(doi) => debug!(%doi, "resolved by DOI"),
            Resolution::TitleSearch(_) => debug!("resolved by title search"),
        }

        let target_name = build_target_filename(&resolved.record);
        if resolved.record.has_placeholders() {
            warn!(target = %target_name, "metadata incomplete; using placeholders");
        }
        if target_name == candidate.file_name {
            info!("already has target name");
            return FileOutcome::Skipped {
                path: candidate.path.clone(),
                reason: SkipReason::AlreadyNamed,
            };
        }

        let target = candidate.directory.join(&target_name);
        self.rename_into(candidate, target).await
    }

    async fn rename_into(&self, candidate: &CandidateFile, target: PathBuf) -> FileOutcome {
        let collision = || FileOutcome::Skipped {
            path: candidate.path.clone(),
            reason: SkipReason::Collision {
                target: target.clone(),
            },
        };

        if !self.claims.claim(&target) {
            info!(target = %target.display(), "target claimed by another file; skipping");
            return collision();
        }

        match tokio::fs::try_exists(&target).await {
            Ok(false) => {}
            Ok(true) => {
                info!(target = %target.display(), "target already exists; skipping");
                return collision();
            }
            Err(source) => {
                self.claims.release(&target);
                error!(target = %target.display(), error = %source, "cannot check target");
                return FileOutcome::Failed {
                    path: candidate.path.clone(),
                    error: FileError::Rename { target, source },
                };
            }
        }

        if self.dry_run {
            info!(target = %target.display(), "dry run; would rename");
            return FileOutcome::Planned {
                from: candidate.path.clone(),
                to: target,
            };
        }

        match tokio::fs::rename(&candidate.path, &target).await {
            Ok(()) => {
                info!(from = %candidate.file_name, to = %target.display(), "renamed");
                FileOutcome::Renamed {
                    from: candidate.path.clone(),
                    to: target,
                }
            }
            Err(source) => {
                self.claims.release(&target);
                error!(target = %target.display(), error = %source, "rename failed");
                FileOutcome::Failed {
                    path: candidate.path.clone(),
                    error: FileError::Rename { target, source },
                }
            }
        }
    }
}
