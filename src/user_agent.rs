//! Shared User-Agent string for registry HTTP traffic.
//!
//! Crossref asks API clients to identify themselves; a stable UA with a
//! project URL (and an optional contact address) routes requests to the
//! polite pool.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/paper-renamer";

/// Default User-Agent for registry requests.
///
/// When `mailto` is non-empty it is appended as a `mailto:` token, matching
/// the format Crossref documents for polite clients.
#[must_use]
pub(crate) fn registry_user_agent(mailto: Option<&str>) -> String {
    let version = env!("CARGO_PKG_VERSION");
    match mailto.map(str::trim).filter(|m| !m.is_empty()) {
        Some(mailto) => {
            format!("paper-renamer/{version} (research-tool; +{PROJECT_UA_URL}; mailto:{mailto})")
        }
        None => format!("paper-renamer/{version} (research-tool; +{PROJECT_UA_URL})"),
    }
}
