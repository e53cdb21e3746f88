//! Text parsing for extracted page content.
//!
//! This module turns raw page text into the two inputs the resolver needs:
//! a DOI candidate when one is printed, and a title-search query for the
//! fallback path.
//!
//! # Example
//!
//! ```
//! use renamer_core::parser::{find_doi, normalize_whitespace};
//!
//! let text = normalize_whitespace("Journal of Things\nhttps://doi.org/10.1234/abcd.567\n");
//! assert_eq!(find_doi(&text), Some("10.1234/abcd.567".to_string()));
//! ```

mod doi;
mod text;

pub use doi::find_doi;
pub use text::{TITLE_QUERY_LINES, TITLE_QUERY_MAX_CHARS, normalize_whitespace, title_query};
