//! User-Agent string for catalog traffic.

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/harvester";

/// Default User-Agent for search, metadata and download requests.
#[must_use]
pub(crate) fn default_catalog_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("harvester/{version} (public-domain-corpus-tool; +{PROJECT_UA_URL})")
}
