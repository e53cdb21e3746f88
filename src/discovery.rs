//! Candidate PDF discovery under a root directory.
//!
//! Candidates are keyed by file name. Two PDFs with the same name in
//! different subdirectories collide in the map; the later one (in sorted walk
//! order) wins and the collision is logged with both paths.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// File extension matched by discovery.
pub const PDF_EXTENSION: &str = ".pdf";

/// One file to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Full path to the file.
    pub path: PathBuf,
    /// Directory containing the file; the rename target lives here too.
    pub directory: PathBuf,
    /// Original file name.
    pub file_name: String,
}

impl CandidateFile {
    /// Builds a candidate from a file path.
    ///
    /// Returns `None` when the path has no parent or no UTF-8 file name.
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let file_name = path.file_name()?.to_str()?.to_string();
        let directory = path.parent()?.to_path_buf();
        Some(Self {
            path,
            directory,
            file_name,
        })
    }
}

/// Options controlling which files are collected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Also accept `.PDF`, `.Pdf`, etc.
    pub case_insensitive_extension: bool,
}

/// Errors that abort discovery before any file is processed.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The root path does not exist or cannot be read.
    #[error("cannot read root directory {path}: {source}\n  Suggestion: Check the path exists and is readable")]
    RootUnreadable {
        /// The root that failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The root path is not a directory.
    #[error("root path {path} is not a directory\n  Suggestion: Pass the folder that contains your PDFs")]
    NotADirectory {
        /// The root that was given.
        path: PathBuf,
    },
}

/// Returns true if `file_name` carries the PDF extension under `options`.
#[must_use]
pub fn has_pdf_extension(file_name: &str, options: DiscoveryOptions) -> bool {
    if options.case_insensitive_extension {
        file_name
            .len()
            .checked_sub(PDF_EXTENSION.len())
            .and_then(|start| file_name.get(start..))
            .is_some_and(|tail| tail.eq_ignore_ascii_case(PDF_EXTENSION))
    } else {
        file_name.ends_with(PDF_EXTENSION)
    }
}

/// Recursively collects PDF files under `root`, keyed by file name.
///
/// Unreadable entries below the root are logged and skipped.
///
/// # Errors
///
/// Returns [`DiscoveryError`] if the root is missing, unreadable, or not a
/// directory.
#[tracing::instrument(skip(options), fields(root = %root.display()))]
pub fn discover_pdfs(
    root: &Path,
    options: DiscoveryOptions,
) -> Result<BTreeMap<String, CandidateFile>, DiscoveryError> {
    let metadata = std::fs::metadata(root).map_err(|source| DiscoveryError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(DiscoveryError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let mut candidates: BTreeMap<String, CandidateFile> = BTreeMap::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                warn!(error = %error, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(candidate) = CandidateFile::from_path(entry.path()) else {
            debug!(path = %entry.path().display(), "skipping file with non-UTF-8 name");
            continue;
        };
        if !has_pdf_extension(&candidate.file_name, options) {
            continue;
        }

        if let Some(previous) = candidates.insert(candidate.file_name.clone(), candidate.clone()) {
            warn!(
                file_name = %candidate.file_name,
                dropped = %previous.path.display(),
                kept = %candidate.path.display(),
                "duplicate file name; only one will be processed"
            );
        }
    }

    info!(count = candidates.len(), "discovered PDF files");
    Ok(candidates)
}
