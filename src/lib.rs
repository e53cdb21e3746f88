//! Paper Renamer Core Library
//!
//! This library renames PDF papers in a directory tree to a readable
//! `Author, Year - Title.pdf` form. A DOI is pulled from the first pages of
//! each document (or a title search is used when none is printed), the
//! Crossref registry resolves it into bibliographic fields, and the file is
//! renamed in place.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`discovery`] - Recursive candidate file collection
//! - [`extract`] - PDF text extraction for the first pages
//! - [`parser`] - DOI detection and title-query construction from page text
//! - [`resolver`] - Registry lookups and bibliographic record projection
//! - [`rename`] - Per-file rename worker and the concurrent batch engine

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod discovery;
pub mod extract;
pub mod parser;
pub mod rename;
pub mod resolver;
mod user_agent;

// Re-export commonly used types
pub use discovery::{CandidateFile, DiscoveryError, DiscoveryOptions, discover_pdfs};
pub use extract::{DEFAULT_PAGES, ExtractError, LopdfExtractor, TextExtractor};
pub use parser::{find_doi, normalize_whitespace, title_query};
pub use rename::{
    BatchReport, DEFAULT_CONCURRENCY, EngineError, FileOutcome, RenameConfig, RenameEngine,
    RenameWorker, SkipReason, build_target_filename, sanitize_filename,
};
pub use resolver::{
    BibliographicRecord, CrossrefClient, DEFAULT_PER_HOST_CONNECTIONS, HttpSettings,
    MetadataSource, ResolveError, WorkRecord,
};
