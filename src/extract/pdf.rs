//! `lopdf`-backed text extraction.
//!
//! `Document::extract_text` only breaks lines at the end of a text object,
//! and most producers put a whole page in one `BT ... ET` block. The page
//! content is walked here instead, with a line break on every operator that
//! moves to a new line.

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Encoding, Object, ObjectId};
use tracing::{debug, warn};

use super::{ExtractError, TextExtractor};

/// Kerning offsets in `TJ` arrays below this (thousandths of an em) read as
/// a word gap.
const WORD_GAP_THRESHOLD: f32 = -100.0;

/// Extracts plain text from the leading pages of a PDF with `lopdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfExtractor;

impl LopdfExtractor {
    /// Creates a new extractor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for LopdfExtractor {
    fn extract_pages(&self, path: &Path, max_pages: usize) -> Result<String, ExtractError> {
        if max_pages == 0 {
            return Ok(String::new());
        }

        // lopdf can panic on malformed fonts and content streams
        match catch_unwind(AssertUnwindSafe(|| extract_with_lopdf(path, max_pages))) {
            Ok(result) => result,
            Err(_) => {
                warn!(path = %path.display(), "lopdf panicked during extraction");
                Err(ExtractError::panicked(path))
            }
        }
    }
}

fn extract_with_lopdf(path: &Path, max_pages: usize) -> Result<String, ExtractError> {
    let document = Document::load(path).map_err(|e| ExtractError::open(path, e))?;

    let pages = document.get_pages();
    if pages.is_empty() {
        debug!(path = %path.display(), "PDF has no pages");
        return Ok(String::new());
    }
    let page_ids: Vec<ObjectId> = pages.values().copied().take(max_pages).collect();
    debug!(path = %path.display(), pages = page_ids.len(), "extracting page text");

    let mut text = String::new();
    for page_id in page_ids {
        page_text(&document, page_id, &mut text).map_err(|e| ExtractError::text(path, e))?;
        line_break(&mut text);
    }
    Ok(text)
}

/// Appends the text of one page, one output line per text line.
fn page_text(document: &Document, page_id: ObjectId, text: &mut String) -> lopdf::Result<()> {
    let encodings = page_encodings(document, page_id)?;
    let content = Content::decode(&document.get_page_content(page_id)?)?;

    let mut encoding: Option<&Encoding> = None;
    let mut matrix_y: Option<f32> = None;
    for operation in &content.operations {
        match operation.operator.as_str() {
            "Tf" => {
                encoding = operation
                    .operands
                    .first()
                    .and_then(|font| font.as_name().ok())
                    .and_then(|name| encodings.get(name));
            }
            "Tj" => show_strings(text, encoding, &operation.operands),
            "TJ" => {
                if let Some(Object::Array(items)) = operation.operands.first() {
                    show_strings(text, encoding, items);
                }
            }
            "'" => {
                line_break(text);
                show_strings(text, encoding, &operation.operands);
            }
            "\"" => {
                line_break(text);
                show_strings(text, encoding, operation.operands.get(2..).unwrap_or_default());
            }
            "T*" | "ET" => line_break(text),
            "Td" | "TD" => {
                if operand_f32(operation, 1).is_some_and(|ty| ty != 0.0) {
                    line_break(text);
                } else {
                    word_gap(text);
                }
            }
            "Tm" => {
                let y = operand_f32(operation, 5);
                if y.is_some() && y == matrix_y {
                    word_gap(text);
                } else {
                    line_break(text);
                }
                matrix_y = y;
            }
            _ => {}
        }
    }
    Ok(())
}

fn page_encodings<'a>(
    document: &'a Document,
    page_id: ObjectId,
) -> lopdf::Result<BTreeMap<Vec<u8>, Encoding<'a>>> {
    let mut encodings = BTreeMap::new();
    for (name, font) in document.get_page_fonts(page_id)? {
        match font.get_font_encoding(document) {
            Ok(encoding) => {
                encodings.insert(name, encoding);
            }
            Err(e) => {
                debug!(font = %String::from_utf8_lossy(&name), error = %e, "skipping font without usable encoding");
            }
        }
    }
    Ok(encodings)
}

/// Decodes string operands; numbers are `TJ` kerning offsets.
fn show_strings(text: &mut String, encoding: Option<&Encoding>, operands: &[Object]) {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => {
                let Some(encoding) = encoding else {
                    continue;
                };
                match Document::decode_text(encoding, bytes) {
                    Ok(decoded) => text.push_str(&decoded),
                    Err(e) => debug!(error = %e, "undecodable text string"),
                }
            }
            Object::Integer(_) | Object::Real(_) => {
                if operand.as_float().is_ok_and(|offset| offset < WORD_GAP_THRESHOLD) {
                    word_gap(text);
                }
            }
            _ => {}
        }
    }
}

fn operand_f32(operation: &Operation, index: usize) -> Option<f32> {
    operation.operands.get(index).and_then(|o| o.as_float().ok())
}

fn line_break(text: &mut String) {
    while text.ends_with(' ') {
        text.pop();
    }
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

fn word_gap(text: &mut String) {
    if !text.is_empty() && !text.ends_with([' ', '\n']) {
        text.push(' ');
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use lopdf::{Stream, dictionary};

    use super::*;
    use crate::parser::{find_doi, title_query};

    /// Writes a PDF with one page per entry, each page a single content stream.
    fn write_pdf(path: &Path, pages: Vec<Vec<Operation>>) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for operations in pages {
            let content = Content { operations }.encode().unwrap();
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }
        let count = i64::try_from(kids.len()).unwrap();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    /// One text object, one `Td` move per line, as pdfTeX writes a page.
    fn text_block(lines: &[&str]) -> Vec<Operation> {
        let mut ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 10.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
        ];
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                ops.push(Operation::new("Td", vec![0.into(), (-12).into()]));
            }
            ops.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        }
        ops.push(Operation::new("ET", vec![]));
        ops
    }

    #[test]
    fn test_lopdf_extractor_zero_pages_is_empty() {
        let text = LopdfExtractor::new()
            .extract_pages(Path::new("/does/not/matter.pdf"), 0)
            .unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn test_lopdf_extractor_missing_file_is_open_error() {
        let err = LopdfExtractor::new()
            .extract_pages(Path::new("/definitely/missing/file.pdf"), 2)
            .unwrap_err();
        assert!(matches!(err, ExtractError::Open { .. }), "got: {err:?}");
    }

    #[test]
    fn test_lopdf_extractor_garbage_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf at all").unwrap();

        let result = LopdfExtractor::new().extract_pages(&path, 2);
        assert!(result.is_err(), "garbage input must not extract");
    }

    #[test]
    fn test_lopdf_extractor_keeps_lines_within_one_text_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.pdf");
        write_pdf(
            &path,
            vec![text_block(&[
                "A Study of Things",
                "Jane Doe",
                "https://doi.org/10.1234/abcd.567",
                "Received 1 March 2020",
            ])],
        );

        let text = LopdfExtractor::new().extract_pages(&path, 3).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "A Study of Things",
                "Jane Doe",
                "https://doi.org/10.1234/abcd.567",
                "Received 1 March 2020",
            ]
        );
        assert_eq!(find_doi(&text), Some("10.1234/abcd.567".to_string()));
        assert!(title_query(&text).unwrap().starts_with("A Study of Things Jane Doe"));
    }

    #[test]
    fn test_lopdf_extractor_reads_only_leading_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.pdf");
        write_pdf(
            &path,
            vec![
                text_block(&["Title Page"]),
                text_block(&["Introduction"]),
                text_block(&["References", "doi:10.1234/late.ref"]),
            ],
        );

        let extractor = LopdfExtractor::new();
        let two = extractor.extract_pages(&path, 2).unwrap();
        assert_eq!(two.lines().collect::<Vec<_>>(), ["Title Page", "Introduction"]);
        assert_eq!(find_doi(&two), None);

        let three = extractor.extract_pages(&path, 3).unwrap();
        assert_eq!(find_doi(&three), Some("10.1234/late.ref".to_string()));
    }

    #[test]
    fn test_lopdf_extractor_line_and_word_operators() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.pdf");
        write_pdf(
            &path,
            vec![vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 10.into()]),
                Operation::new("Tm", vec![1.into(), 0.into(), 0.into(), 1.into(), 72.into(), 700.into()]),
                Operation::new(
                    "TJ",
                    vec![Object::Array(vec![
                        Object::string_literal("Deep"),
                        (-250).into(),
                        Object::string_literal("Lear"),
                        (-15).into(),
                        Object::string_literal("ning"),
                    ])],
                ),
                Operation::new("Td", vec![40.into(), 0.into()]),
                Operation::new("Tj", vec![Object::string_literal("Survey")]),
                Operation::new("T*", vec![]),
                Operation::new("Tj", vec![Object::string_literal("Second line")]),
                Operation::new("'", vec![Object::string_literal("Third line")]),
                Operation::new("Tm", vec![1.into(), 0.into(), 0.into(), 1.into(), 72.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal("Fourth line")]),
                Operation::new("ET", vec![]),
            ]],
        );

        let text = LopdfExtractor::new().extract_pages(&path, 1).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            ["Deep Learning Survey", "Second line", "Third line", "Fourth line"]
        );
    }
}
