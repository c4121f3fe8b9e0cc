use crate::sparql::content_negotiation::NotAcceptable;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

#[derive(thiserror::Error, Debug)]
pub enum SparqlServerError {
    #[error("No query or update given. Use the 'query' or 'update' parameter, or send the request as application/sparql-query or application/sparql-update.")]
    MissingQuery,
    #[error("Unsupported Query Type")]
    UnsupportedQueryType,
    #[error("Error after executing the update query.")]
    UpdateExecution,
    #[error("Mimetype: {0} not acceptable")]
    NotAcceptable(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Query evaluation timed out")]
    Timeout,
    #[error("Internal server error: {0}")]
    Internal(anyhow::Error),
}

impl From<NotAcceptable> for SparqlServerError {
    fn from(value: NotAcceptable) -> Self {
        Self::NotAcceptable(value.media_type)
    }
}

impl IntoResponse for SparqlServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            SparqlServerError::MissingQuery
            | SparqlServerError::UnsupportedQueryType
            | SparqlServerError::UpdateExecution
            | SparqlServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            SparqlServerError::NotAcceptable(_) => StatusCode::NOT_ACCEPTABLE,
            SparqlServerError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            SparqlServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match self {
            SparqlServerError::Internal(e) => {
                error!("Request failed: {e:#}");
                "Internal server error".to_owned()
            }
            other => other.to_string(),
        };

        (status, message).into_response()
    }
}
