//! Error types for registry lookups.
//!
//! This module defines structured errors for metadata resolution,
//! following the What/Why/Fix pattern used across the project.

use thiserror::Error;

/// Errors that can occur while resolving metadata from the registry.
///
/// Every variant is a per-file resolution failure: the worker logs it and
/// skips the file without renaming.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The registry could not be reached (DNS, connect, TLS, reset).
    #[error("cannot reach registry for '{input}': {reason}\n  Suggestion: Check your network connection")]
    Network {
        /// The DOI or query being resolved.
        input: String,
        /// The underlying transport failure.
        reason: String,
    },

    /// The request exceeded its connect or total timeout.
    #[error("registry request timed out for '{input}'\n  Suggestion: Increase --timeout or try again later")]
    Timeout {
        /// The DOI or query being resolved.
        input: String,
    },

    /// The registry answered with a non-200 status.
    #[error("registry returned HTTP {status} for '{input}': {reason}")]
    HttpStatus {
        /// The DOI or query being resolved.
        input: String,
        /// The HTTP status code.
        status: u16,
        /// Human-readable explanation of the status.
        reason: String,
    },

    /// The registry answered 200 but not with a JSON body.
    #[error("registry returned non-JSON content type '{content_type}' for '{input}'")]
    NotJson {
        /// The DOI or query being resolved.
        input: String,
        /// The content type that was received.
        content_type: String,
    },

    /// The JSON body did not have the expected `{message: ...}` shape.
    #[error("unexpected registry response format for '{input}': {reason}")]
    InvalidBody {
        /// The DOI or query being resolved.
        input: String,
        /// The decode failure.
        reason: String,
    },

    /// A title search returned no items.
    #[error("no registry match for title query '{query}'")]
    NoMatch {
        /// The query that matched nothing.
        query: String,
    },

    /// The page text produced no usable title query.
    #[error("no text available to build a title query\n  Suggestion: The PDF may be scanned images without a text layer")]
    EmptyQuery,

    /// The HTTP client could not be constructed.
    #[error("HTTP client construction failed: {reason}")]
    ClientBuild {
        /// Why construction failed.
        reason: String,
    },
}

impl ResolveError {
    /// Creates a `Network` error.
    #[must_use]
    pub fn network(input: &str, reason: impl ToString) -> Self {
        Self::Network {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `Timeout` error.
    #[must_use]
    pub fn timeout(input: &str) -> Self {
        Self::Timeout {
            input: input.to_string(),
        }
    }

    /// Creates an `HttpStatus` error with a reason derived from the status.
    #[must_use]
    pub fn http_status(input: &str, status: u16) -> Self {
        let reason = match status {
            404 => "not found in registry".to_string(),
            429 => "registry rate limit exceeded".to_string(),
            s if s >= 500 => "registry unavailable".to_string(),
            s => format!("unexpected status {s}"),
        };
        Self::HttpStatus {
            input: input.to_string(),
            status,
            reason,
        }
    }

    /// Creates a `NotJson` error.
    #[must_use]
    pub fn not_json(input: &str, content_type: &str) -> Self {
        Self::NotJson {
            input: input.to_string(),
            content_type: content_type.to_string(),
        }
    }

    /// Creates an `InvalidBody` error.
    #[must_use]
    pub fn invalid_body(input: &str, reason: impl ToString) -> Self {
        Self::InvalidBody {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `NoMatch` error.
    #[must_use]
    pub fn no_match(query: &str) -> Self {
        Self::NoMatch {
            query: query.to_string(),
        }
    }

    /// Creates a `ClientBuild` error.
    #[must_use]
    pub fn client_build(reason: impl ToString) -> Self {
        Self::ClientBuild {
            reason: reason.to_string(),
        }
    }

    /// Maps a transport error into `Timeout` or `Network`.
    #[must_use]
    pub fn from_transport(input: &str, error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(input)
        } else {
            Self::network(input, error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_error_http_status_404_reason() {
        let err = ResolveError::http_status("10.1234/x", 404);
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("10.1234/x"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn test_resolve_error_http_status_5xx_reason() {
        let msg = ResolveError::http_status("10.1234/x", 503).to_string();
        assert!(msg.contains("unavailable"), "got: {msg}");
    }

    #[test]
    fn test_resolve_error_timeout_has_suggestion() {
        let msg = ResolveError::timeout("10.1234/x").to_string();
        assert!(msg.contains("timed out"));
        assert!(msg.contains("Suggestion"));
    }

    #[test]
    fn test_resolve_error_not_json_message() {
        let msg = ResolveError::not_json("10.1234/x", "text/html").to_string();
        assert!(msg.contains("text/html"));
    }

    #[test]
    fn test_resolve_error_no_match_message() {
        let msg = ResolveError::no_match("A Study").to_string();
        assert!(msg.contains("A Study"));
    }

    #[test]
    fn test_resolve_error_clone() {
        let err = ResolveError::network("10.1234/x", "connection refused");
        assert_eq!(err.to_string(), err.clone().to_string());
    }
}
