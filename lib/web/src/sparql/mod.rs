use crate::AppState;
use axum::routing::get;
use axum::Router;

pub(crate) mod content_negotiation;
mod dispatch;
pub(crate) mod extract;
mod render;

pub use content_negotiation::{negotiate, NegotiatedFormat, NotAcceptable, ResultCategory, SerializerTag};
pub use extract::{ParsedRequest, ProtocolOperation, RequestParams, SparqlRequest};

pub fn create_sparql_routes() -> Router<AppState> {
    Router::new().route(
        "/sparql",
        get(dispatch::handle_sparql).post(dispatch::handle_sparql),
    )
}
