use oxigraph::sparql::EvaluationError;
use oxigraph::store::{LoaderError, StorageError};
use oxrdfio::RdfParseError;
use spargebra::SparqlSyntaxError;
use std::io;
use std::path::PathBuf;
use tokio::task::JoinError;

/// An error raised while loading the initial file into a [`SharedStore`](crate::SharedStore).
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be opened or read.
    #[error("Can't read file {}", path.display())]
    Io {
        /// The file that was read.
        path: PathBuf,
        #[source]
        error: io::Error,
    },
    /// No format was given and none could be guessed from the file name.
    #[error("Can't guess the RDF format of {}", path.display())]
    UnknownFormat {
        /// The file that was read.
        path: PathBuf,
    },
    /// The content of the file is not valid in the chosen format.
    #[error("Can not parse {} as {format}", path.display())]
    Parsing {
        /// The file that was read.
        path: PathBuf,
        /// The name of the format used for parsing.
        format: &'static str,
        #[source]
        error: RdfParseError,
    },
    /// Any other failure of the loader.
    #[error("Can not load {}", path.display())]
    Loader {
        /// The file that was read.
        path: PathBuf,
        #[source]
        error: LoaderError,
    },
    /// An error raised during the insertion in the store.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The text is neither a SPARQL query nor a supported SPARQL update.
#[derive(Debug, thiserror::Error)]
pub enum UnsupportedQueryType {
    /// The text parses neither as a query nor as an update.
    #[error("not a query ({query}) nor an update ({update})")]
    Syntax {
        query: SparqlSyntaxError,
        update: SparqlSyntaxError,
    },
    /// The update request does not contain any operation.
    #[error("the update request is empty")]
    EmptyUpdate,
    /// The first operation of the update request has no protocol-level kind.
    #[error("{0} operations are not supported by this endpoint")]
    UnsupportedOperation(&'static str),
}

/// The protocol dataset of a request cannot be applied to its algebra.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Invalid graph IRI '{iri}': {message}")]
    InvalidGraphIri { iri: String, message: String },
    #[error(
        "using-graph-uri or using-named-graph-uri must not be set when the update contains a USING clause"
    )]
    UsingConflict,
}

/// An error raised while executing a classified query or update against the store.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error("Store task failed: {0}")]
    Task(#[from] JoinError),
}
