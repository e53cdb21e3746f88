//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod socket_guard;

use std::path::Path;
use std::sync::Arc;

use renamer_core::{
    CrossrefClient, ExtractError, HttpSettings, RenameConfig, RenameEngine, TextExtractor,
};

/// Treats each "PDF" as UTF-8 text so fixtures stay readable.
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_pages(&self, path: &Path, _max_pages: usize) -> Result<String, ExtractError> {
        std::fs::read_to_string(path).map_err(|e| ExtractError::open(path, e))
    }
}

/// Builds an engine against a mock registry with plain-text extraction.
pub fn engine_for(base_url: &str, config: RenameConfig) -> RenameEngine {
    let client = CrossrefClient::with_base_url(&HttpSettings::default(), base_url).unwrap();
    RenameEngine::with_components(config, Arc::new(client), Arc::new(PlainTextExtractor)).unwrap()
}

/// Crossref-shaped single-work response body.
pub fn work_body(title: &str, given: &str, family: &str, year: i64) -> serde_json::Value {
    serde_json::json!({
        "status": "ok",
        "message-type": "work",
        "message": {
            "title": [title],
            "author": [{"given": given, "family": family}],
            "published-print": {"date-parts": [[year]]}
        }
    })
}
