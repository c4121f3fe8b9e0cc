use crate::classify::{Algebra, QueryClassification};
use crate::error::DatasetError;
use spargebra::algebra::QueryDataset;
use spargebra::term::NamedNode;
use spargebra::{GraphUpdateOperation, Query};

/// The RDF dataset given by the parameters of a protocol request.
///
/// For queries these are the `default-graph-uri` and `named-graph-uri` parameters, for updates
/// the `using-graph-uri` and `using-named-graph-uri` parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolDataset {
    pub default_graph_uris: Vec<String>,
    pub named_graph_uris: Vec<String>,
}

impl ProtocolDataset {
    /// Returns whether the request did not specify any graph.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.default_graph_uris.is_empty() && self.named_graph_uris.is_empty()
    }

    fn to_query_dataset(&self) -> Result<QueryDataset, DatasetError> {
        Ok(QueryDataset {
            default: parse_graph_iris(&self.default_graph_uris)?,
            named: Some(parse_graph_iris(&self.named_graph_uris)?),
        })
    }
}

impl QueryClassification {
    /// Applies the protocol dataset of the request to the algebra.
    ///
    /// The protocol dataset replaces the `FROM` and `FROM NAMED` clauses of a query and becomes
    /// the `USING` dataset of every `DELETE`/`INSERT` operation of an update.
    /// An empty protocol dataset leaves the algebra untouched.
    pub fn with_protocol_dataset(
        mut self,
        dataset: &ProtocolDataset,
    ) -> Result<Self, DatasetError> {
        if dataset.is_empty() {
            return Ok(self);
        }
        let query_dataset = dataset.to_query_dataset()?;
        match &mut self.algebra {
            Algebra::Query(query) => {
                *query_dataset_mut(query) = Some(query_dataset);
            }
            Algebra::Update(update) => {
                for operation in &mut update.operations {
                    if let GraphUpdateOperation::DeleteInsert { using, .. } = operation {
                        if using.is_some() {
                            return Err(DatasetError::UsingConflict);
                        }
                        *using = Some(query_dataset.clone());
                    }
                }
            }
        }
        Ok(self)
    }
}

fn query_dataset_mut(query: &mut Query) -> &mut Option<QueryDataset> {
    match query {
        Query::Select { dataset, .. }
        | Query::Construct { dataset, .. }
        | Query::Describe { dataset, .. }
        | Query::Ask { dataset, .. } => dataset,
    }
}

fn parse_graph_iris(iris: &[String]) -> Result<Vec<NamedNode>, DatasetError> {
    iris.iter()
        .map(|iri| {
            NamedNode::new(iri.as_str()).map_err(|e| DatasetError::InvalidGraphIri {
                iri: iri.clone(),
                message: e.to_string(),
            })
        })
        .collect()
}
