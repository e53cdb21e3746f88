//! Metadata resolution: turning a DOI or page text into bibliographic fields.
//!
//! # Architecture
//!
//! - [`MetadataSource`] - Async trait for registry backends
//! - [`CrossrefClient`] - Crossref REST implementation (DOI lookup + title search)
//! - [`WorkRecord`] - Typed registry record parsed at the resolver boundary
//! - [`BibliographicRecord`] - Normalized `{title, author, year}` with placeholders
//! - [`resolve_metadata`] - DOI-direct path with title-search fallback
//!
//! # Example
//!
//! ```no_run
//! use renamer_core::resolver::{CrossrefClient, HttpSettings, resolve_metadata};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CrossrefClient::new(&HttpSettings::default())?;
//! let resolved = resolve_metadata(&client, Some("10.1234/abcd.567"), "").await?;
//! println!("{} ({})", resolved.record.title, resolved.record.year);
//! # Ok(())
//! # }
//! ```

mod crossref;
mod error;
mod http_client;
mod record;

pub use crossref::CrossrefClient;
pub use error::ResolveError;
pub use http_client::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_PER_HOST_CONNECTIONS, DEFAULT_REQUEST_TIMEOUT_SECS,
    HttpSettings, build_registry_http_client,
};
pub use record::{
    BibliographicRecord, Contributor, DateField, UNKNOWN_AUTHOR, UNKNOWN_TITLE, UNKNOWN_YEAR,
    WorkRecord,
};

use async_trait::async_trait;
use tracing::debug;

use crate::parser::title_query;

/// A registry that can resolve works by identifier or by title.
///
/// # Object Safety
///
/// This trait uses `async_trait` so the batch engine can hold an
/// `Arc<dyn MetadataSource>` shared by every worker.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Returns the source name used in logs (e.g., "crossref").
    fn name(&self) -> &str;

    /// Looks up a single work by DOI.
    async fn lookup_doi(&self, doi: &str) -> Result<WorkRecord, ResolveError>;

    /// Searches works by title and returns the single best match.
    async fn search_title(&self, query: &str) -> Result<WorkRecord, ResolveError>;
}

/// Which lookup produced a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Resolved directly from a DOI found in the text.
    Doi(String),
    /// Resolved through a title search built from the leading lines.
    TitleSearch(String),
}

/// A bibliographic record together with how it was found.
#[derive(Debug, Clone)]
pub struct ResolvedMetadata {
    /// The projected fields.
    pub record: BibliographicRecord,
    /// The lookup path taken.
    pub via: Resolution,
}

/// Resolves bibliographic fields for one document.
///
/// With a DOI, performs one identifier lookup. Without one, builds a title
/// query from the leading lines of `raw_text` and performs one search. No
/// retries; any failure is returned to the caller.
///
/// # Errors
///
/// Returns [`ResolveError`] when the lookup fails, the search matches
/// nothing, or no title query can be built.
pub async fn resolve_metadata(
    source: &dyn MetadataSource,
    doi: Option<&str>,
    raw_text: &str,
) -> Result<ResolvedMetadata, ResolveError> {
    let (work, via) = if let Some(doi) = doi {
        debug!(source = source.name(), %doi, "resolving by DOI");
        (
            source.lookup_doi(doi).await?,
            Resolution::Doi(doi.to_string()),
        )
    } else {
        let query = title_query(raw_text).ok_or(ResolveError::EmptyQuery)?;
        debug!(source = source.name(), query_len = query.len(), "resolving by title search");
        (
            source.search_title(&query).await?,
            Resolution::TitleSearch(query),
        )
    };

    Ok(ResolvedMetadata {
        record: BibliographicRecord::from_work(&work),
        via,
    })
}
