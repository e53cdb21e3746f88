//! Typed registry records and their projection into bibliographic fields.
//!
//! Registry responses are parsed once into [`WorkRecord`] at the resolver
//! boundary. Every field is optional and date parts are kept as raw JSON so
//! a malformed date cannot fail the whole parse; [`BibliographicRecord`]
//! then applies the fallback chains and never leaves a field empty.

use serde::Deserialize;
use serde_json::Value;

use crate::parser::normalize_whitespace;

/// Placeholder used when no title is available.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Placeholder used when neither an author nor an editor is available.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Placeholder used when no date field yields a year.
pub const UNKNOWN_YEAR: &str = "Unknown Year";

// ==================== Registry Response Types ====================

/// Response of `GET /works/{doi}`.
#[derive(Debug, Deserialize)]
pub(crate) struct WorkResponse {
    pub message: WorkRecord,
}

/// Response of `GET /works?query.title=...`.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub message: SearchMessage,
}

/// The `message` field of a search response.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchMessage {
    #[serde(default)]
    pub items: Vec<WorkRecord>,
}

/// One work as returned by the registry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorkRecord {
    /// Title list; the first entry is the main title.
    pub title: Option<Vec<String>>,
    /// Author list in byline order.
    pub author: Option<Vec<Contributor>>,
    /// Editor list, used when no author is recorded.
    pub editor: Option<Vec<Contributor>>,
    /// Print publication date.
    pub published_print: Option<DateField>,
    /// Online publication date.
    pub published_online: Option<DateField>,
    /// Registry record creation date.
    pub created: Option<DateField>,
    /// Earliest known publication date.
    pub issued: Option<DateField>,
}

/// An author or editor entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Contributor {
    /// Given (first) name.
    pub given: Option<String>,
    /// Family (last) name.
    pub family: Option<String>,
}

/// A registry date: `{"date-parts": [[year, month, day]]}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DateField {
    /// Raw `date-parts` value; validated lazily by [`DateField::year`].
    pub date_parts: Option<Value>,
}

impl DateField {
    /// Returns the year from `date-parts[0][0]`, or `None` on any structural
    /// mismatch (missing index, null, non-numeric).
    #[must_use]
    pub fn year(&self) -> Option<i64> {
        let first = self.date_parts.as_ref()?.get(0)?.get(0)?;
        match first {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

// ==================== Bibliographic Projection ====================

/// Normalized `{title, author, year}` used to build the new filename.
///
/// Every field always holds a value; missing registry data becomes a
/// placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibliographicRecord {
    /// Main title.
    pub title: String,
    /// Primary author (or editor) display name.
    pub author: String,
    /// Publication year.
    pub year: String,
}

impl BibliographicRecord {
    /// Projects a registry record into bibliographic fields.
    ///
    /// - title: first title entry, else [`UNKNOWN_TITLE`]
    /// - author: first author's `given family`, else `family`, else `given`;
    ///   the same on the first editor when the author list is absent or
    ///   empty; else [`UNKNOWN_AUTHOR`]
    /// - year: first of published-print, published-online, created, issued
    ///   with a usable `date-parts[0][0]`, else [`UNKNOWN_YEAR`]
    #[must_use]
    pub fn from_work(work: &WorkRecord) -> Self {
        Self {
            title: project_title(work).unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            author: project_author(work).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            year: project_year(work).map_or_else(|| UNKNOWN_YEAR.to_string(), |y| y.to_string()),
        }
    }

    /// Returns true if any field fell back to a placeholder.
    #[must_use]
    pub fn has_placeholders(&self) -> bool {
        self.title == UNKNOWN_TITLE || self.author == UNKNOWN_AUTHOR || self.year == UNKNOWN_YEAR
    }
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| normalize_whitespace(v))
        .filter(|v| !v.is_empty())
}

fn project_title(work: &WorkRecord) -> Option<String> {
    non_blank(work.title.as_ref()?.first())
}

fn display_name(contributor: &Contributor) -> Option<String> {
    match (
        non_blank(contributor.given.as_ref()),
        non_blank(contributor.family.as_ref()),
    ) {
        (Some(given), Some(family)) => Some(format!("{given} {family}")),
        (None, Some(family)) => Some(family),
        (Some(given), None) => Some(given),
        (None, None) => None,
    }
}

fn first_contributor(list: Option<&Vec<Contributor>>) -> Option<&Contributor> {
    list.and_then(|entries| entries.first())
}

fn project_author(work: &WorkRecord) -> Option<String> {
    match first_contributor(work.author.as_ref()) {
        Some(author) => display_name(author),
        None => first_contributor(work.editor.as_ref()).and_then(display_name),
    }
}

fn project_year(work: &WorkRecord) -> Option<i64> {
    [
        &work.published_print,
        &work.published_online,
        &work.created,
        &work.issued,
    ]
    .into_iter()
    .flatten()
    .find_map(DateField::year)
}
