use adhs_store::ProtocolDataset;
use axum::body::Bytes;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method};
use mediatype::names::APPLICATION;
use mediatype::{MediaType, Name};

const SPARQL_QUERY: MediaType<'static> =
    MediaType::new(APPLICATION, Name::new_unchecked("sparql-query"));
const SPARQL_UPDATE: MediaType<'static> =
    MediaType::new(APPLICATION, Name::new_unchecked("sparql-update"));
const FORM: MediaType<'static> =
    MediaType::new(APPLICATION, Name::new_unchecked("x-www-form-urlencoded"));

/// Whether the text was submitted as a query or as an update.
///
/// This only reflects the protocol parameter. The classifier decides what the text really is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolOperation {
    Query,
    Update,
}

/// The SPARQL text of a request together with its protocol parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    pub query_text: String,
    pub operation: ProtocolOperation,
    pub dataset: ProtocolDataset,
    pub format_override: Option<String>,
}

/// `application/x-www-form-urlencoded` key-value pairs in their original order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams(Vec<(String, String)>);

impl RequestParams {
    pub fn parse(input: &[u8]) -> Self {
        Self(
            url::form_urlencoded::parse(input)
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        )
    }

    pub fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn all(&self, key: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }

    fn dataset(&self, default_key: &str, named_key: &str) -> ProtocolDataset {
        ProtocolDataset {
            default_graph_uris: self.all(default_key),
            named_graph_uris: self.all(named_key),
        }
    }

    fn query_dataset(&self) -> ProtocolDataset {
        self.dataset("default-graph-uri", "named-graph-uri")
    }

    fn update_dataset(&self) -> ProtocolDataset {
        self.dataset("using-graph-uri", "using-named-graph-uri")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Form,
    SparqlQuery,
    SparqlUpdate,
}

impl BodyKind {
    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(CONTENT_TYPE)?.to_str().ok()?;
        let media_type = MediaType::parse(value).ok()?;
        let essence = media_type.essence();
        if essence == FORM {
            Some(Self::Form)
        } else if essence == SPARQL_QUERY {
            Some(Self::SparqlQuery)
        } else if essence == SPARQL_UPDATE {
            Some(Self::SparqlUpdate)
        } else {
            None
        }
    }
}

/// The raw parts of a request to the SPARQL endpoint.
#[derive(Debug)]
pub struct SparqlRequest {
    method: Method,
    body_kind: Option<BodyKind>,
    query_params: RequestParams,
    form: Option<RequestParams>,
    body: Bytes,
}

impl SparqlRequest {
    pub fn new(method: Method, headers: &HeaderMap, raw_query: Option<&str>, body: Bytes) -> Self {
        let body_kind = if method == Method::POST {
            BodyKind::from_headers(headers)
        } else {
            None
        };
        let form = (body_kind == Some(BodyKind::Form)).then(|| RequestParams::parse(&body));
        Self {
            method,
            body_kind,
            query_params: RequestParams::parse(raw_query.unwrap_or_default().as_bytes()),
            form,
            body,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The `format` or `output` parameter that replaces the `Accept` header, if any.
    ///
    /// Form fields take precedence over the query string.
    pub fn format_override(&self) -> Option<&str> {
        fn lookup(params: &RequestParams) -> Option<&str> {
            params
                .first("format")
                .or_else(|| params.first("output"))
                .filter(|f| !f.trim().is_empty())
        }
        self.form
            .as_ref()
            .and_then(lookup)
            .or_else(|| lookup(&self.query_params))
    }

    /// Extracts the query or update of the request.
    ///
    /// Returns [None] if the request carries no (non-blank) SPARQL text.
    pub fn extract(&self) -> Option<ParsedRequest> {
        let (query_text, operation, dataset) = match (&self.method, self.body_kind) {
            (&Method::GET | &Method::HEAD, _) => (
                self.query_params.first("query")?.to_owned(),
                ProtocolOperation::Query,
                self.query_params.query_dataset(),
            ),
            (&Method::POST, Some(BodyKind::Form)) => {
                let form = self.form.as_ref()?;
                if let Some(query) = form.first("query") {
                    (query.to_owned(), ProtocolOperation::Query, form.query_dataset())
                } else {
                    (
                        form.first("update")?.to_owned(),
                        ProtocolOperation::Update,
                        form.update_dataset(),
                    )
                }
            }
            (&Method::POST, Some(BodyKind::SparqlQuery)) => (
                std::str::from_utf8(&self.body).ok()?.to_owned(),
                ProtocolOperation::Query,
                self.query_params.query_dataset(),
            ),
            (&Method::POST, Some(BodyKind::SparqlUpdate)) => (
                std::str::from_utf8(&self.body).ok()?.to_owned(),
                ProtocolOperation::Update,
                self.query_params.update_dataset(),
            ),
            _ => return None,
        };

        if query_text.trim().is_empty() {
            return None;
        }

        Some(ParsedRequest {
            query_text,
            operation,
            dataset,
            format_override: self.format_override().map(str::to_owned),
        })
    }
}
