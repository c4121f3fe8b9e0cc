use crate::html;
use crate::sparql::content_negotiation::{NegotiatedFormat, SerializerTag};
use oxigraph::model::Term;
use oxigraph::sparql::{EvaluationError, QueryResults, QuerySolutionIter, QueryTripleIter};
use oxrdfio::{RdfFormat, RdfSerializer};
use sparesults::{QueryResultsFormat, QueryResultsSerializer};
use std::{fmt, io};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Could not format the HTML page")]
    Html(#[from] fmt::Error),
    #[error("The {tag} serializer can not write {shape}")]
    UnsupportedTag {
        tag: SerializerTag,
        shape: &'static str,
    },
}

/// Serializes query results in the negotiated format.
///
/// Consumes the result iterators, so it must run while the store is still locked.
pub fn render(results: QueryResults, format: NegotiatedFormat) -> Result<Vec<u8>, RenderError> {
    match results {
        QueryResults::Solutions(solutions) => match format.tag {
            SerializerTag::Html => render_solutions_html(solutions),
            tag => serialize_solutions(solutions, results_format(tag, "solutions")?),
        },
        QueryResults::Boolean(value) => match format.tag {
            SerializerTag::Html => {
                Ok(html::results_page(&["boolean"], &[vec![value.to_string()]])?.into_bytes())
            }
            tag => Ok(QueryResultsSerializer::from_format(results_format(tag, "a boolean")?)
                .serialize_boolean_to_writer(Vec::new(), value)?),
        },
        QueryResults::Graph(triples) => serialize_graph(triples, rdf_format(format.tag)?),
    }
}

fn results_format(tag: SerializerTag, shape: &'static str) -> Result<QueryResultsFormat, RenderError> {
    match tag {
        SerializerTag::Xml => Ok(QueryResultsFormat::Xml),
        SerializerTag::Json => Ok(QueryResultsFormat::Json),
        SerializerTag::Csv => Ok(QueryResultsFormat::Csv),
        tag => Err(RenderError::UnsupportedTag { tag, shape }),
    }
}

fn rdf_format(tag: SerializerTag) -> Result<RdfFormat, RenderError> {
    match tag {
        SerializerTag::Xml => Ok(RdfFormat::RdfXml),
        SerializerTag::Turtle => Ok(RdfFormat::Turtle),
        SerializerTag::NTriples => Ok(RdfFormat::NTriples),
        SerializerTag::TriG => Ok(RdfFormat::TriG),
        tag => Err(RenderError::UnsupportedTag { tag, shape: "a graph" }),
    }
}

fn serialize_solutions(
    solutions: QuerySolutionIter,
    format: QueryResultsFormat,
) -> Result<Vec<u8>, RenderError> {
    let mut serializer = QueryResultsSerializer::from_format(format)
        .serialize_solutions_to_writer(Vec::new(), solutions.variables().to_vec())?;
    for solution in solutions {
        serializer.serialize(&solution?)?;
    }
    Ok(serializer.finish()?)
}

fn serialize_graph(triples: QueryTripleIter, format: RdfFormat) -> Result<Vec<u8>, RenderError> {
    let mut serializer = RdfSerializer::from_format(format).for_writer(Vec::new());
    for triple in triples {
        serializer.serialize_triple(triple?.as_ref())?;
    }
    Ok(serializer.finish()?)
}

fn render_solutions_html(solutions: QuerySolutionIter) -> Result<Vec<u8>, RenderError> {
    let variables = solutions.variables().to_vec();
    let header = variables.iter().map(|v| v.as_str()).collect::<Vec<_>>();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for solution in solutions {
        let solution = solution?;
        rows.push(
            variables
                .iter()
                .map(|v| solution.get(v).map(cell_text).unwrap_or_default())
                .collect(),
        );
    }
    Ok(html::results_page(&header, &rows)?.into_bytes())
}

/// The IRI, lexical value or blank node label of a term.
fn cell_text(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => node.as_str().to_owned(),
        Term::Literal(literal) => literal.value().to_owned(),
        term => term.to_string(),
    }
}
