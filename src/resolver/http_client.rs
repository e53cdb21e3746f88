//! Shared HTTP client construction policy for registry lookups.
//!
//! One client is built per batch and shared by every worker, so its pool is
//! the only cross-file shared resource. Timeouts and pool sizing come from
//! [`HttpSettings`], passed in explicitly.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Proxy};
use tracing::warn;

use crate::user_agent;

use super::ResolveError;

/// Default connect timeout for registry requests.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default total timeout for one registry request (connect + response body).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default cap on simultaneous in-flight requests to the registry host.
pub const DEFAULT_PER_HOST_CONNECTIONS: usize = 5;

/// Network settings for the registry client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    /// Timeout for establishing a connection.
    pub connect_timeout: Duration,
    /// Timeout for the whole request including the body read.
    pub request_timeout: Duration,
    /// Maximum simultaneous requests (and pooled idle connections) per host.
    pub per_host_connections: usize,
    /// Contact address for the Crossref polite pool.
    pub mailto: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            per_host_connections: DEFAULT_PER_HOST_CONNECTIONS,
            mailto: None,
        }
    }
}

/// Builds the registry HTTP client from `settings`.
///
/// # Errors
///
/// Returns [`ResolveError::ClientBuild`] when client construction fails.
pub fn build_registry_http_client(settings: &HttpSettings) -> Result<Client, ResolveError> {
    match try_build_client(settings, false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Panic) => {
            // Some sandboxed macOS environments panic when querying system
            // proxy settings; retry with env-proxy lookup only.
            warn!("registry client hit system proxy panic; using env-proxy fallback builder");
            match try_build_client(settings, true) {
                Ok(client) => Ok(client),
                Err(BuildClientFailure::Panic) => Err(ResolveError::client_build(
                    "client construction panicked while initializing networking",
                )),
                Err(BuildClientFailure::Build(error)) => Err(ResolveError::client_build(error)),
            }
        }
        Err(BuildClientFailure::Build(error)) => Err(ResolveError::client_build(error)),
    }
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

fn try_build_client(
    settings: &HttpSettings,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    catch_unwind(AssertUnwindSafe(|| {
        let mut builder = base_builder(settings);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn base_builder(settings: &HttpSettings) -> ClientBuilder {
    Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .pool_max_idle_per_host(settings.per_host_connections)
        .user_agent(user_agent::registry_user_agent(settings.mailto.as_deref()))
        .gzip(true)
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = env_proxy_for_scheme("https")
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = env_proxy_for_scheme("http")
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn env_proxy_for_scheme(scheme: &str) -> Option<String> {
    match scheme {
        "https" => find_first_proxy_var(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"]),
        "http" => find_first_proxy_var(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"]),
        _ => None,
    }
}

fn find_first_proxy_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}
