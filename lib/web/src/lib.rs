//! A [SPARQL 1.1 Protocol](https://www.w3.org/TR/sparql11-protocol/) endpoint serving an
//! in-memory [`SharedStore`](adhs_store::SharedStore).

use axum::extract::{DefaultBodyLimit, State};
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{routing::get, Router};
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

mod config;
mod error;
mod html;
pub mod sparql;
mod state;

use crate::config::{normalize_base_path, MAX_SPARQL_BODY_SIZE};
use crate::sparql::create_sparql_routes;
pub use config::ServerConfig;
pub use error::SparqlServerError;
pub use state::AppState;

/// Serves the SPARQL endpoint until the process receives Ctrl-C or SIGTERM.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let cors = config.cors;
    let bind = config.bind.clone();
    let app = create_router(AppState {
        store: config.store,
        base_path: normalize_base_path(config.base_path.as_deref()),
        source: config.source,
        query_timeout: config.query_timeout,
    });
    let app = if cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    };

    let listener = tokio::net::TcpListener::bind(bind.as_str()).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

/// Creates the routes of the server: the SPARQL endpoint and a redirect to it from the root.
pub fn create_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(redirect_to_endpoint).post(redirect_to_endpoint))
        .merge(create_sparql_routes());
    let routes = if state.base_path.is_empty() {
        routes
    } else {
        Router::new().nest(&state.base_path, routes)
    };

    routes
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_SPARQL_BODY_SIZE))
        .layer(TraceLayer::new_for_http())
}

async fn redirect_to_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::FOUND, [(LOCATION, state.endpoint_path())])
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Could not listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Could not listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutting down");
}
