use adhs_store::SharedStore;
use std::time::Duration;

pub const MAX_SPARQL_BODY_SIZE: usize = 1024 * 1024 * 128; // 128MB

/// Holds the configuration for an ADHS web server.
pub struct ServerConfig {
    /// The store that is served.
    pub store: SharedStore,
    /// The IP address or DNS name and port that the socket binds to.
    pub bind: String,
    /// A path prefix under which all routes are served, e.g. `/adhs`.
    pub base_path: Option<String>,
    /// Whether CORS is enabled.
    pub cors: bool,
    /// The name of the file the store was loaded from, shown on the query page.
    pub source: String,
    /// The maximum time a query may be evaluated before the request is aborted.
    pub query_timeout: Option<Duration>,
}

/// Turns a user supplied base path into `/segment/...` without a trailing slash.
///
/// Returns an empty string if no prefix should be used.
pub(crate) fn normalize_base_path(base_path: Option<&str>) -> String {
    let trimmed = base_path.unwrap_or_default().trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
