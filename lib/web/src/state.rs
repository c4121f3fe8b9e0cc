use adhs_store::SharedStore;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    /// Normalized route prefix, empty if the routes are served at the root.
    pub base_path: String,
    pub source: String,
    pub query_timeout: Option<Duration>,
}

impl AppState {
    /// The absolute path of the SPARQL endpoint.
    pub fn endpoint_path(&self) -> String {
        format!("{}/sparql", self.base_path)
    }
}
