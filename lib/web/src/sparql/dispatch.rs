use crate::error::SparqlServerError;
use crate::html;
use crate::sparql::content_negotiation::{negotiate, ResultCategory, SerializerTag};
use crate::sparql::extract::SparqlRequest;
use crate::sparql::render::render;
use crate::AppState;
use adhs_store::{classify, Algebra, ExecutionError, QueryKind};
use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::header::{ACCEPT, CONTENT_TYPE, HOST};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use tracing::{debug, info, warn, Level};

/// Answers a request to the SPARQL endpoint.
///
/// The request is extracted, classified, negotiated, executed and rendered in that order. Every
/// failure is turned into a response by [SparqlServerError].
pub async fn handle_sparql(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    RawQuery(raw_query): RawQuery,
    body: Bytes,
) -> Result<Response, SparqlServerError> {
    let request = SparqlRequest::new(method, &headers, raw_query.as_deref(), body);
    let accept = effective_accept(&request, &headers);

    let Some(parsed) = request.extract() else {
        return query_page(&state, &headers, accept.as_ref());
    };

    match &accept {
        Some(accept) => info!(
            "Received query via {}: {} with accept header: {}",
            request.method(),
            parsed.query_text,
            String::from_utf8_lossy(accept.as_bytes())
        ),
        None => info!(
            "Received query via {}: {} with no accept header.",
            request.method(),
            parsed.query_text
        ),
    }

    let classification = classify(&parsed.query_text).map_err(|e| {
        warn!("Could not classify request: {e}");
        SparqlServerError::UnsupportedQueryType
    })?;
    let kind = classification.kind();
    debug!(
        "Classified request submitted as {:?} as {kind}",
        parsed.operation
    );
    if tracing::enabled!(Level::DEBUG) {
        let paths = classification.property_paths();
        if !paths.is_empty() {
            debug!(
                "Property paths: {}",
                paths
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }

    let classification = classification
        .with_protocol_dataset(&parsed.dataset)
        .map_err(|e| SparqlServerError::BadRequest(e.to_string()))?;

    match classification.into_algebra() {
        Algebra::Update(update) => {
            state.store.update(update).await.map_err(|e| match e {
                ExecutionError::Evaluation(e) => {
                    warn!("Error after executing the update query: {e}");
                    SparqlServerError::UpdateExecution
                }
                e @ ExecutionError::Task(_) => SparqlServerError::Internal(e.into()),
            })?;
            info!("Executed {kind}");
            Ok(StatusCode::OK.into_response())
        }
        Algebra::Query(query) => execute_query(&state, query, kind, accept.as_ref()).await,
    }
}

async fn execute_query(
    state: &AppState,
    query: spargebra::Query,
    kind: QueryKind,
    accept: Option<&HeaderValue>,
) -> Result<Response, SparqlServerError> {
    let format = negotiate(accept, ResultCategory::of(kind))?;
    debug!(
        "Negotiated {} ({}) for {kind}",
        format.media_type, format.tag
    );

    let evaluation = state
        .store
        .query(query, move |results| render(results, format));
    let rendered = match state.query_timeout {
        Some(timeout) => tokio::time::timeout(timeout, evaluation)
            .await
            .map_err(|_| {
                warn!("{kind} did not finish within {timeout:?}");
                SparqlServerError::Timeout
            })?,
        None => evaluation.await,
    };

    let body = rendered
        .map_err(|e| SparqlServerError::Internal(e.into()))?
        .map_err(|e| SparqlServerError::Internal(e.into()))?;
    Ok(([(CONTENT_TYPE, format.media_type)], body).into_response())
}

/// The `format`/`output` override if given, the `Accept` header otherwise.
fn effective_accept(request: &SparqlRequest, headers: &HeaderMap) -> Option<HeaderValue> {
    match request.format_override() {
        Some(format) => match HeaderValue::from_str(format) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Ignoring invalid format override {format:?}: {e}");
                headers.get(ACCEPT).cloned()
            }
        },
        None => headers.get(ACCEPT).cloned(),
    }
}

/// Serves the query page to browsers that did not send a query.
fn query_page(
    state: &AppState,
    headers: &HeaderMap,
    accept: Option<&HeaderValue>,
) -> Result<Response, SparqlServerError> {
    match negotiate(accept, ResultCategory::ResultSet) {
        Ok(format) if format.tag == SerializerTag::Html => {
            let host = headers
                .get(HOST)
                .and_then(|h| h.to_str().ok())
                .unwrap_or_default();
            Ok(Html(html::query_page(&state.source, host, &state.endpoint_path())).into_response())
        }
        _ => {
            warn!("Request without query or update");
            Err(SparqlServerError::MissingQuery)
        }
    }
}
