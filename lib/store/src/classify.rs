//! Classification of SPARQL request texts into queries and updates.
//!
//! The entry point of the module is [`classify`].

use crate::error::UnsupportedQueryType;
use crate::path::{collect_paths, PathExpr};
use spargebra::algebra::GraphPattern;
use spargebra::term::{GraphNamePattern, GroundQuadPattern, NamedNodePattern, TriplePattern};
use spargebra::{GraphUpdateOperation, Query, Update};
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// The kind of a SPARQL request as seen by the protocol layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Select,
    Ask,
    Construct,
    Describe,
    InsertData,
    DeleteData,
    Modify,
    DeleteWhere,
}

impl QueryKind {
    /// Returns whether requests of this kind mutate the store.
    #[inline]
    pub fn is_update(self) -> bool {
        matches!(
            self,
            Self::InsertData | Self::DeleteData | Self::Modify | Self::DeleteWhere
        )
    }

    /// Returns whether queries of this kind produce an RDF graph rather than a result set.
    #[inline]
    pub fn is_graph(self) -> bool {
        matches!(self, Self::Construct | Self::Describe)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Select => "SelectQuery",
            Self::Ask => "AskQuery",
            Self::Construct => "ConstructQuery",
            Self::Describe => "DescribeQuery",
            Self::InsertData => "InsertData",
            Self::DeleteData => "DeleteData",
            Self::Modify => "Modify",
            Self::DeleteWhere => "DeleteWhere",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The parsed algebra of a request.
#[derive(Debug, Clone)]
pub enum Algebra {
    Query(Query),
    Update(Update),
}

/// A request text that has been parsed and classified.
///
/// The kind is always derived from the algebra held next to it.
#[derive(Debug, Clone)]
pub struct QueryClassification {
    kind: QueryKind,
    pub(crate) algebra: Algebra,
}

impl QueryClassification {
    #[inline]
    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    #[inline]
    pub fn algebra(&self) -> &Algebra {
        &self.algebra
    }

    #[inline]
    pub fn into_algebra(self) -> Algebra {
        self.algebra
    }

    /// Returns the property paths used by the request, sorted and without duplicates.
    pub fn property_paths(&self) -> BTreeSet<PathExpr> {
        let mut paths = BTreeSet::new();
        match &self.algebra {
            Algebra::Query(query) => collect_paths(query_pattern(query), &mut paths),
            Algebra::Update(update) => {
                for operation in &update.operations {
                    if let GraphUpdateOperation::DeleteInsert { pattern, .. } = operation {
                        collect_paths(pattern, &mut paths);
                    }
                }
            }
        }
        paths
    }
}

/// Parses `text` as a SPARQL query or, failing that, as a SPARQL update, and classifies it.
///
/// Only the first operation of an update request determines its kind.
///
/// ```
/// use adhs_store::{classify, QueryKind};
///
/// let classification = classify("SELECT ?s WHERE { ?s ?p ?o }")?;
/// assert_eq!(classification.kind(), QueryKind::Select);
///
/// let classification = classify("INSERT DATA { <urn:a> <urn:b> <urn:c> }")?;
/// assert_eq!(classification.kind(), QueryKind::InsertData);
///
/// assert!(classify("SELECT ?s WHERE {").is_err());
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub fn classify(text: &str) -> Result<QueryClassification, UnsupportedQueryType> {
    let query_error = match Query::parse(text, None) {
        Ok(query) => {
            let kind = query_kind(&query);
            debug!("Classified request as {kind}");
            return Ok(QueryClassification {
                kind,
                algebra: Algebra::Query(query),
            });
        }
        Err(error) => error,
    };

    let update = Update::parse(text, None).map_err(|update_error| {
        UnsupportedQueryType::Syntax {
            query: query_error,
            update: update_error,
        }
    })?;
    let kind = update
        .operations
        .first()
        .ok_or(UnsupportedQueryType::EmptyUpdate)
        .and_then(update_kind)?;
    if update.operations.len() > 1 {
        debug!(
            "Classified update request with {} operations as {kind}",
            update.operations.len()
        );
    } else {
        debug!("Classified request as {kind}");
    }
    Ok(QueryClassification {
        kind,
        algebra: Algebra::Update(update),
    })
}

fn query_kind(query: &Query) -> QueryKind {
    match query {
        Query::Select { .. } => QueryKind::Select,
        Query::Construct { .. } => QueryKind::Construct,
        Query::Describe { .. } => QueryKind::Describe,
        Query::Ask { .. } => QueryKind::Ask,
    }
}

fn query_pattern(query: &Query) -> &GraphPattern {
    match query {
        Query::Select { pattern, .. }
        | Query::Construct { pattern, .. }
        | Query::Describe { pattern, .. }
        | Query::Ask { pattern, .. } => pattern,
    }
}

fn update_kind(operation: &GraphUpdateOperation) -> Result<QueryKind, UnsupportedQueryType> {
    match operation {
        GraphUpdateOperation::InsertData { .. } => Ok(QueryKind::InsertData),
        GraphUpdateOperation::DeleteData { .. } => Ok(QueryKind::DeleteData),
        GraphUpdateOperation::DeleteInsert {
            delete,
            insert,
            using,
            pattern,
        } => {
            if insert.is_empty() && using.is_none() && is_delete_where(delete, pattern) {
                Ok(QueryKind::DeleteWhere)
            } else {
                Ok(QueryKind::Modify)
            }
        }
        GraphUpdateOperation::Load { .. } => {
            Err(UnsupportedQueryType::UnsupportedOperation("LOAD"))
        }
        GraphUpdateOperation::Clear { .. } => {
            Err(UnsupportedQueryType::UnsupportedOperation("CLEAR"))
        }
        GraphUpdateOperation::Create { .. } => {
            Err(UnsupportedQueryType::UnsupportedOperation("CREATE"))
        }
        GraphUpdateOperation::Drop { .. } => {
            Err(UnsupportedQueryType::UnsupportedOperation("DROP"))
        }
    }
}

/// `DELETE WHERE { T }` is parsed into a delete of `T` whose pattern is built from `T` itself.
///
/// The algebra keeps no trace of the short form, so `DELETE { T } WHERE { T }` is a
/// `DeleteWhere` as well.
fn is_delete_where(delete: &[GroundQuadPattern], pattern: &GraphPattern) -> bool {
    let mut matched = Vec::with_capacity(delete.len());
    if !pattern_quads(pattern, None, &mut matched) {
        return false;
    }
    let deleted = delete.iter().map(|quad| {
        let graph = match &quad.graph_name {
            GraphNamePattern::DefaultGraph => None,
            GraphNamePattern::NamedNode(node) => Some(NamedNodePattern::NamedNode(node.clone())),
            GraphNamePattern::Variable(variable) => {
                Some(NamedNodePattern::Variable(variable.clone()))
            }
        };
        let triple = TriplePattern {
            subject: quad.subject.clone().into(),
            predicate: quad.predicate.clone(),
            object: quad.object.clone().into(),
        };
        (graph, triple)
    });
    deleted.eq(matched)
}

/// Flattens a pattern made only of BGPs, joins and `GRAPH` blocks into quads.
fn pattern_quads(
    pattern: &GraphPattern,
    graph: Option<&NamedNodePattern>,
    quads: &mut Vec<(Option<NamedNodePattern>, TriplePattern)>,
) -> bool {
    match pattern {
        GraphPattern::Bgp { patterns } => {
            quads.extend(patterns.iter().map(|p| (graph.cloned(), p.clone())));
            true
        }
        GraphPattern::Join { left, right } => {
            pattern_quads(left, graph, quads) && pattern_quads(right, graph, quads)
        }
        GraphPattern::Graph { name, inner } => pattern_quads(inner, Some(name), quads),
        _ => false,
    }
}
