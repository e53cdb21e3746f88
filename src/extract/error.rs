//! Error types for PDF text extraction.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while extracting text from a PDF.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The file could not be opened or parsed as a PDF.
    #[error("cannot open PDF {path}: {reason}\n  Suggestion: Check that the file is a readable, uncorrupted PDF")]
    Open {
        /// The file that failed to open.
        path: PathBuf,
        /// Why the open failed.
        reason: String,
    },

    /// The PDF opened but its pages could not be decoded to text.
    #[error("cannot extract text from {path}: {reason}")]
    Text {
        /// The file whose pages failed to decode.
        path: PathBuf,
        /// Why text decoding failed.
        reason: String,
    },

    /// The extraction library panicked on malformed content.
    #[error("PDF extraction panicked for {path}")]
    Panicked {
        /// The file that triggered the panic.
        path: PathBuf,
    },
}

impl ExtractError {
    /// Creates an `Open` error.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Open {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `Text` error.
    #[must_use]
    pub fn text(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Text {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `Panicked` error.
    #[must_use]
    pub fn panicked(path: impl Into<PathBuf>) -> Self {
        Self::Panicked { path: path.into() }
    }
}
