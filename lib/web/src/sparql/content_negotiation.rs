use adhs_store::QueryKind;
use axum::http::HeaderValue;
use headers::Header;
use headers_accept::Accept;
use mediatype::names::{APPLICATION, CSV, HTML, JSON, N_TRIPLES, TEXT, TRIG, TURTLE, XML};
use mediatype::{MediaType, MediaTypeList, Name, ReadParams};
use std::fmt;
use std::iter;
use tracing::debug;

/// The serializer used to write a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SerializerTag {
    Xml,
    Json,
    Csv,
    Html,
    Turtle,
    NTriples,
    TriG,
}

impl SerializerTag {
    pub fn name(self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Html => "html",
            Self::Turtle => "turtle",
            Self::NTriples => "nt11",
            Self::TriG => "trig",
        }
    }
}

impl fmt::Display for SerializerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The outcome of the content negotiation: the `Content-Type` of the response and the
/// serializer writing its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NegotiatedFormat {
    pub media_type: &'static str,
    pub tag: SerializerTag,
}

impl NegotiatedFormat {
    const fn new(media_type: &'static str, tag: SerializerTag) -> Self {
        Self { media_type, tag }
    }
}

/// The shape of the results of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCategory {
    /// Solutions and booleans of `SELECT` and `ASK` queries.
    ResultSet,
    /// Triples of `CONSTRUCT` and `DESCRIBE` queries.
    Graph,
}

impl ResultCategory {
    pub fn of(kind: QueryKind) -> Self {
        if kind.is_graph() {
            Self::Graph
        } else {
            Self::ResultSet
        }
    }

    /// The acceptable media types and their formats. The first entry is the default.
    fn table(self) -> (&'static [MediaType<'static>], &'static [NegotiatedFormat]) {
        match self {
            Self::ResultSet => (&RESULT_SET_MEDIA_TYPES, &RESULT_SET_FORMATS),
            Self::Graph => (&GRAPH_MEDIA_TYPES, &GRAPH_FORMATS),
        }
    }
}

static RESULT_SET_MEDIA_TYPES: [MediaType<'static>; 8] = [
    MediaType::from_parts(APPLICATION, Name::new_unchecked("sparql-results"), Some(XML), &[]),
    MediaType::new(APPLICATION, XML),
    MediaType::from_parts(APPLICATION, Name::new_unchecked("rdf"), Some(XML), &[]),
    MediaType::new(APPLICATION, JSON),
    MediaType::from_parts(APPLICATION, Name::new_unchecked("sparql-results"), Some(JSON), &[]),
    MediaType::new(TEXT, CSV),
    MediaType::new(TEXT, HTML),
    MediaType::from_parts(APPLICATION, Name::new_unchecked("xhtml"), Some(XML), &[]),
];

static RESULT_SET_FORMATS: [NegotiatedFormat; 8] = [
    NegotiatedFormat::new("application/sparql-results+xml", SerializerTag::Xml),
    NegotiatedFormat::new("application/xml", SerializerTag::Xml),
    NegotiatedFormat::new("application/rdf+xml", SerializerTag::Xml),
    NegotiatedFormat::new("application/json", SerializerTag::Json),
    NegotiatedFormat::new("application/sparql-results+json", SerializerTag::Json),
    NegotiatedFormat::new("text/csv", SerializerTag::Csv),
    NegotiatedFormat::new("text/html", SerializerTag::Html),
    NegotiatedFormat::new("application/xhtml+xml", SerializerTag::Html),
];

static GRAPH_MEDIA_TYPES: [MediaType<'static>; 6] = [
    MediaType::new(TEXT, TURTLE),
    MediaType::new(APPLICATION, Name::new_unchecked("x-turtle")),
    MediaType::from_parts(APPLICATION, Name::new_unchecked("rdf"), Some(XML), &[]),
    MediaType::new(APPLICATION, XML),
    MediaType::new(APPLICATION, N_TRIPLES),
    MediaType::new(APPLICATION, TRIG),
];

static GRAPH_FORMATS: [NegotiatedFormat; 6] = [
    NegotiatedFormat::new("text/turtle", SerializerTag::Turtle),
    NegotiatedFormat::new("application/x-turtle", SerializerTag::Turtle),
    NegotiatedFormat::new("application/rdf+xml", SerializerTag::Xml),
    NegotiatedFormat::new("application/xml", SerializerTag::Xml),
    NegotiatedFormat::new("application/n-triples", SerializerTag::NTriples),
    NegotiatedFormat::new("application/trig", SerializerTag::TriG),
];

/// None of the formats of a [`ResultCategory`] is acceptable to the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Mimetype: {media_type} not acceptable")]
pub struct NotAcceptable {
    /// The media type preferred by the client.
    pub media_type: String,
}

/// Chooses the response format of a query whose results have the given `category`.
///
/// A missing or malformed `Accept` header accepts anything, which selects the default format
/// of the category.
pub fn negotiate(
    accept: Option<&HeaderValue>,
    category: ResultCategory,
) -> Result<NegotiatedFormat, NotAcceptable> {
    let (media_types, formats) = category.table();
    let default = formats[0];

    let Some(value) = accept else {
        return Ok(default);
    };
    let Some(parsed) = without_parameters(value)
        .and_then(|stripped| Accept::decode(&mut iter::once(&stripped)).ok())
    else {
        debug!("Ignoring malformed Accept header {value:?}");
        return Ok(default);
    };

    parsed
        .negotiate(media_types)
        .and_then(|chosen| media_types.iter().position(|m| m == chosen))
        .map(|index| formats[index])
        .ok_or_else(|| NotAcceptable {
            media_type: preferred_media_type(value),
        })
}

/// Rebuilds an `Accept` header value keeping only the essence and the `q` parameter of each
/// media range. The table entries carry no parameters, so `text/csv; charset=utf-8` has to
/// match `text/csv`.
fn without_parameters(value: &HeaderValue) -> Option<HeaderValue> {
    let raw = value.to_str().ok()?;
    let q = Name::new_unchecked("q");

    let mut ranges = Vec::new();
    for media_type in MediaTypeList::new(raw) {
        let media_type = media_type.ok()?;
        let essence = media_type.essence().to_string();
        ranges.push(match media_type.get_param(q) {
            Some(quality) => format!("{essence};q={}", quality.as_str()),
            None => essence,
        });
    }
    HeaderValue::from_str(&ranges.join(", ")).ok()
}

/// Returns the media type with the highest quality in an `Accept` header value.
fn preferred_media_type(value: &HeaderValue) -> String {
    let raw = String::from_utf8_lossy(value.as_bytes());
    let q = Name::new_unchecked("q");

    let mut best: Option<(f32, String)> = None;
    for media_type in MediaTypeList::new(&raw).filter_map(Result::ok) {
        let quality = media_type
            .get_param(q)
            .and_then(|v| v.as_str().parse::<f32>().ok())
            .unwrap_or(1.0);
        let better = match &best {
            Some((best_quality, _)) => quality > *best_quality,
            None => true,
        };
        if better {
            best = Some((quality, media_type.essence().to_string()));
        }
    }
    best.map_or_else(|| raw.trim().to_owned(), |(_, media_type)| media_type)
}
