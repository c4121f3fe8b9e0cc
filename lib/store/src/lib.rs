//! The RDF dataset served by ADHS and the classification of SPARQL requests.
//!
//! A [`SharedStore`] is loaded once from a file and then queried and updated through
//! [`QueryClassification`]s produced by [`classify`].

mod classify;
mod dataset;
mod error;
mod loader;
mod path;
mod store;

pub use classify::{classify, Algebra, QueryClassification, QueryKind};
pub use dataset::ProtocolDataset;
pub use error::{DatasetError, ExecutionError, LoadError, UnsupportedQueryType};
pub use loader::guess_format;
pub use path::PathExpr;
pub use store::SharedStore;
