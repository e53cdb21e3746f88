//! Rename pipeline: target naming, the per-file worker, and the batch engine.
//!
//! # Architecture
//!
//! - [`build_target_filename`] - `"{author}, {year} - {title}.pdf"`, sanitized
//! - [`RenameWorker`] - extract, resolve, name, collision-check, rename
//! - [`RenameEngine`] - discovery plus bounded concurrent workers
//! - [`BatchReport`] - every [`FileOutcome`] and the total elapsed time

mod engine;
mod filename;
mod worker;

pub use engine::{BatchReport, DEFAULT_CONCURRENCY, EngineError, RenameConfig, RenameEngine};
pub use filename::{ILLEGAL_FILENAME_CHARS, build_target_filename, sanitize_filename};
pub use worker::{FileError, FileOutcome, RenameWorker, SkipReason};
