//! PDF text extraction for the leading pages of a document.
//!
//! Extraction is a blocking, CPU-bound step. Callers in async code run it on
//! the blocking pool (see [`extract_blocking`]) so one slow document does not
//! stall the other workers.

mod error;
mod pdf;

pub use error::ExtractError;
pub use pdf::LopdfExtractor;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

/// Default number of leading pages scanned for a DOI.
pub const DEFAULT_PAGES: usize = 3;

/// Produces plain text for the first pages of a document.
///
/// Implementations must be safe to call from several blocking threads at
/// once; the batch engine shares one extractor across all workers.
pub trait TextExtractor: Send + Sync {
    /// Returns the text of at most `max_pages` leading pages of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError`] when the file cannot be opened or decoded.
    fn extract_pages(&self, path: &Path, max_pages: usize) -> Result<String, ExtractError>;
}

/// Runs `extractor` on the Tokio blocking pool.
///
/// A panic inside the extractor is reported as [`ExtractError::Panicked`]
/// rather than propagated.
///
/// # Errors
///
/// Returns [`ExtractError`] from the extractor, or `Panicked` if the blocking
/// task did not complete.
pub async fn extract_blocking(
    extractor: Arc<dyn TextExtractor>,
    path: PathBuf,
    max_pages: usize,
) -> Result<String, ExtractError> {
    let task_path = path.clone();
    match tokio::task::spawn_blocking(move || extractor.extract_pages(&task_path, max_pages)).await
    {
        Ok(result) => result,
        Err(join_error) => {
            warn!(path = %path.display(), error = %join_error, "extraction task aborted");
            Err(ExtractError::panicked(path))
        }
    }
}
