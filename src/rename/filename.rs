//! Target filename construction and sanitization.
//!
//! Sanitization runs once, on the fully assembled filename. Fields keep
//! their punctuation until then.

use crate::resolver::BibliographicRecord;

/// Characters removed from filenames: illegal on at least one common filesystem.
pub const ILLEGAL_FILENAME_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Removes every character in [`ILLEGAL_FILENAME_CHARS`].
///
/// Characters are dropped, not replaced, and nothing else changes: no
/// truncation and no whitespace normalization. Applying it twice is the
/// same as applying it once.
///
/// # Examples
///
/// ```
/// use renamer_core::rename::sanitize_filename;
///
/// assert_eq!(sanitize_filename("Smith: A Study"), "Smith A Study");
/// assert_eq!(sanitize_filename("a/b\\c*d?e\"f<g>h|i"), "abcdefghi");
/// ```
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !ILLEGAL_FILENAME_CHARS.contains(c))
        .collect()
}

/// Builds `"{author}, {year} - {title}.pdf"` and sanitizes the result.
///
/// Never fails: every [`BibliographicRecord`] field already holds a value.
#[must_use]
pub fn build_target_filename(record: &BibliographicRecord) -> String {
    sanitize_filename(&format!(
        "{}, {} - {}.pdf",
        record.author, record.year, record.title
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{UNKNOWN_AUTHOR, UNKNOWN_TITLE, UNKNOWN_YEAR};

    fn record(author: &str, year: &str, title: &str) -> BibliographicRecord {
        BibliographicRecord {
            title: title.to_string(),
            author: author.to_string(),
            year: year.to_string(),
        }
    }

    #[test]
    fn test_sanitize_filename_removes_each_illegal_char() {
        for c in ILLEGAL_FILENAME_CHARS {
            let input = format!("a{c}b");
            assert_eq!(sanitize_filename(&input), "ab", "char {c:?} not removed");
        }
    }

    #[test]
    fn test_sanitize_filename_keeps_other_punctuation_and_spacing() {
        assert_eq!(
            sanitize_filename("O'Brien,  (2020) - Ünïcode & more!"),
            "O'Brien,  (2020) - Ünïcode & more!"
        );
    }

    #[test]
    fn test_sanitize_filename_idempotent() {
        let inputs = [
            "Smith: A Study",
            "a//b::c",
            "plain",
            "",
            "<<>>||??**\"\"\\\\",
            "Title: Sub/title? \"quoted\" <tag> | pipe",
        ];
        for input in inputs {
            let once = sanitize_filename(input);
            assert_eq!(sanitize_filename(&once), once, "not idempotent for {input:?}");
            assert!(
                !once.contains(ILLEGAL_FILENAME_CHARS),
                "illegal char left in {once:?}"
            );
        }
    }

    #[test]
    fn test_build_target_filename_format() {
        assert_eq!(
            build_target_filename(&record("Jane Doe", "2020", "A Study")),
            "Jane Doe, 2020 - A Study.pdf"
        );
    }

    #[test]
    fn test_build_target_filename_sanitizes_title_punctuation() {
        assert_eq!(
            build_target_filename(&record("Jane Doe", "2020", "Why? A/B Testing: Revisited")),
            "Jane Doe, 2020 - Why AB Testing Revisited.pdf"
        );
    }

    #[test]
    fn test_build_target_filename_with_placeholders() {
        assert_eq!(
            build_target_filename(&record(UNKNOWN_AUTHOR, UNKNOWN_YEAR, UNKNOWN_TITLE)),
            "Unknown Author, Unknown Year - Unknown Title.pdf"
        );
    }
}
