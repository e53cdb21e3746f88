//! Page-text normalization and title-search query construction.

/// Number of leading lines of page text used for a title search.
pub const TITLE_QUERY_LINES: usize = 15;

/// Maximum length (in characters) of a title-search query.
pub const TITLE_QUERY_MAX_CHARS: usize = 400;

/// Collapses every run of whitespace (including newlines) into one space and
/// trims both ends.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Builds a title-search query from raw extracted page text.
///
/// Takes the first [`TITLE_QUERY_LINES`] lines, drops blank lines, collapses
/// whitespace, and truncates to [`TITLE_QUERY_MAX_CHARS`] characters. Returns
/// `None` when nothing usable remains.
///
/// # Examples
///
/// ```
/// use renamer_core::parser::title_query;
///
/// let query = title_query("  A Study of Things\n\nJane Doe\n").unwrap();
/// assert_eq!(query, "A Study of Things Jane Doe");
/// assert_eq!(title_query("\n \n"), None);
/// ```
#[must_use]
pub fn title_query(raw_text: &str) -> Option<String> {
    let head = raw_text
        .lines()
        .take(TITLE_QUERY_LINES)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let normalized = normalize_whitespace(&head);
    if normalized.is_empty() {
        return None;
    }

    let truncated: String = normalized.chars().take(TITLE_QUERY_MAX_CHARS).collect();
    Some(truncated.trim_end().to_string())
}
