//! Crossref metadata client - DOI lookups and title searches via the Crossref REST API.
//!
//! [`CrossrefClient`] issues at most one request per call and never retries.
//! A response counts as usable only with HTTP 200 and a JSON content type.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::http_client::{HttpSettings, build_registry_http_client};
use super::record::{SearchResponse, WorkRecord, WorkResponse};
use super::{MetadataSource, ResolveError};

/// Default Crossref API base URL.
const DEFAULT_BASE_URL: &str = "https://api.crossref.org";

/// Resolves DOIs and title queries via the Crossref REST API.
///
/// Cloning is cheap: clones share the connection pool and the per-host
/// request limiter.
///
/// # Polite Pool
///
/// When a contact address is configured, every request includes a `mailto`
/// query parameter to access Crossref's polite pool.
#[derive(Clone)]
pub struct CrossrefClient {
    client: Client,
    base_url: String,
    mailto: Option<String>,
    in_flight: Arc<Semaphore>,
}

impl CrossrefClient {
    /// Creates a client against the public Crossref API.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if HTTP client construction fails or the
    /// contact address contains control characters.
    #[tracing::instrument(skip_all)]
    pub fn new(settings: &HttpSettings) -> Result<Self, ResolveError> {
        Self::with_base_url(settings, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if HTTP client construction fails or the
    /// contact address contains control characters.
    #[tracing::instrument(skip_all, fields(base_url))]
    pub fn with_base_url(
        settings: &HttpSettings,
        base_url: impl Into<String>,
    ) -> Result<Self, ResolveError> {
        let mailto = settings
            .mailto
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);
        if let Some(m) = &mailto
            && m.chars().any(char::is_control)
        {
            return Err(ResolveError::client_build(
                "mailto contains invalid control characters",
            ));
        }

        let client = build_registry_http_client(settings)?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            mailto,
            in_flight: Arc::new(Semaphore::new(settings.per_host_connections.max(1))),
        })
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn works_url(&self, doi: &str) -> String {
        let mut url = format!("{}/works/{}", self.base_url, encode_doi_path(doi));
        if let Some(mailto) = &self.mailto {
            url.push_str("?mailto=");
            url.push_str(&urlencoding::encode(mailto));
        }
        url
    }

    fn search_url(&self, query: &str) -> String {
        let mut url = format!(
            "{}/works?query.title={}&rows=1",
            self.base_url,
            urlencoding::encode(query)
        );
        if let Some(mailto) = &self.mailto {
            url.push_str("&mailto=");
            url.push_str(&urlencoding::encode(mailto));
        }
        url
    }

    /// Sends one GET under the per-host limit and decodes a JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: &str, input: &str) -> Result<T, ResolveError> {
        let _permit = self
            .in_flight
            .acquire()
            .await
            .map_err(|_| ResolveError::network(input, "request limiter closed"))?;

        debug!(api_url = %url, "Calling Crossref API");
        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(error = %e, "Crossref API request failed");
            ResolveError::from_transport(input, &e)
        })?;

        check_response(&response, input)?;

        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                ResolveError::timeout(input)
            } else {
                warn!(error = %e, "Failed to parse Crossref response JSON");
                ResolveError::invalid_body(input, e)
            }
        })
    }
}

impl std::fmt::Debug for CrossrefClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossrefClient")
            .field("base_url", &self.base_url)
            .field("mailto", &self.mailto)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MetadataSource for CrossrefClient {
    fn name(&self) -> &'static str {
        "crossref"
    }

    #[tracing::instrument(skip(self), fields(source = "crossref"))]
    async fn lookup_doi(&self, doi: &str) -> Result<WorkRecord, ResolveError> {
        let url = self.works_url(doi);
        let body: WorkResponse = self.get_json(&url, doi).await?;
        Ok(body.message)
    }

    #[tracing::instrument(skip(self), fields(source = "crossref"))]
    async fn search_title(&self, query: &str) -> Result<WorkRecord, ResolveError> {
        if query.trim().is_empty() {
            return Err(ResolveError::EmptyQuery);
        }
        let url = self.search_url(query);
        let body: SearchResponse = self.get_json(&url, query).await?;
        body.message
            .items
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::no_match(query))
    }
}

/// Validates status and content type before the body is read.
fn check_response(response: &Response, input: &str) -> Result<(), ResolveError> {
    if let Some(limit) = response.headers().get("x-rate-limit-limit") {
        debug!(rate_limit = ?limit, "Crossref rate limit");
    }

    let status = response.status().as_u16();
    if status != 200 {
        debug!(status, "Crossref API error");
        return Err(ResolveError::http_status(input, status));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !is_json_content_type(content_type) {
        debug!(content_type, "Crossref response is not JSON");
        return Err(ResolveError::not_json(input, content_type));
    }
    Ok(())
}

fn is_json_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|mime| {
            mime.eq_ignore_ascii_case("application/json")
                || mime.to_ascii_lowercase().ends_with("+json")
        })
}

/// Percent-encodes a DOI for use as a path segment, keeping `/` readable.
fn encode_doi_path(doi: &str) -> String {
    doi.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
