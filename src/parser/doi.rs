//! DOI detection in page text.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

/// Regex pattern for bare DOIs: `10.XXXX/suffix`.
///
/// The registrant is 4-9 digits; the suffix runs until whitespace, an angle
/// bracket, or a quote character.
#[allow(clippy::expect_used)]
static DOI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)10\.\d{4,9}/[^\s<>"']+"#).expect("DOI regex is valid") // Static pattern, safe to panic
});

/// Characters swept in from page layout that never end a DOI.
const TRAILING_NOISE: &[char] = &['.', ',', ';', '(', ')', '[', ']', '{', '}', '<', '>'];

/// Finds the first DOI in normalized page text.
///
/// Trailing punctuation picked up from the surrounding layout (`. , ; ( ) [ ]
/// { } < >`) is stripped from the right end of the match. A candidate whose
/// suffix is empty after stripping is ignored and the scan moves on.
///
/// # Examples
///
/// ```
/// use renamer_core::parser::find_doi;
///
/// assert_eq!(
///     find_doi("Published as doi:10.1234/abcd.567."),
///     Some("10.1234/abcd.567".to_string())
/// );
/// assert_eq!(find_doi("no identifier here"), None);
/// ```
#[tracing::instrument(level = "debug", skip(text), fields(text_len = text.len()))]
#[must_use]
pub fn find_doi(text: &str) -> Option<String> {
    for m in DOI_PATTERN.find_iter(text) {
        trace!(raw = %m.as_str(), "found DOI candidate");
        let cleaned = strip_trailing_noise(m.as_str());
        if has_suffix(cleaned) {
            debug!(doi = %cleaned, "DOI found");
            return Some(cleaned.to_string());
        }
        trace!(raw = %m.as_str(), "DOI candidate empty after cleanup");
    }
    None
}

fn strip_trailing_noise(raw: &str) -> &str {
    raw.trim_end_matches(TRAILING_NOISE)
}

fn has_suffix(doi: &str) -> bool {
    doi.split_once('/')
        .is_some_and(|(_, suffix)| !suffix.is_empty())
}
