//! A shared, in-memory [RDF dataset](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-dataset).
//!
//! The entry point of the module is the [`SharedStore`] struct.

use crate::error::{ExecutionError, LoadError};
use crate::loader;
use oxigraph::sparql::{EvaluationError, Query, QueryResults, Update};
use oxigraph::store::{StorageError, Store};
use oxrdfio::RdfFormat;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task;
use tracing::info;

/// An in-memory RDF dataset shared by all requests of a server.
///
/// Queries are evaluated concurrently with each other while an update has exclusive access to
/// the dataset. A query therefore observes either all or none of the changes of an update.
///
/// Cloning a [`SharedStore`] is cheap and returns a handle to the same dataset.
///
/// Usage example:
/// ```
/// use adhs_store::{classify, Algebra, SharedStore};
/// use oxigraph::sparql::QueryResults;
///
/// # tokio_test::block_on(async {
/// let store = SharedStore::new()?;
///
/// let Algebra::Update(update) = classify("INSERT DATA { <urn:a> <urn:b> <urn:c> }")?.into_algebra() else {
///     unreachable!()
/// };
/// store.update(update).await?;
///
/// let Algebra::Query(query) = classify("ASK { <urn:a> <urn:b> <urn:c> }")?.into_algebra() else {
///     unreachable!()
/// };
/// let found = store
///     .query(query, |results| matches!(results, QueryResults::Boolean(true)))
///     .await?;
/// assert!(found);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// # }).unwrap();
/// ```
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<RwLock<Store>>,
}

impl SharedStore {
    /// Creates an empty [`SharedStore`].
    pub fn new() -> Result<Self, StorageError> {
        Ok(Self::from_store(Store::new()?))
    }

    /// Wraps an existing oxigraph [`Store`].
    pub fn from_store(store: Store) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Creates a [`SharedStore`] holding the content of the RDF file at `path`.
    ///
    /// If `format` is [`None`], it is guessed from the file extension.
    pub fn load_file(path: &Path, format: Option<RdfFormat>) -> Result<Self, LoadError> {
        let store = Store::new()?;
        loader::load_file(&store, path, format)?;
        info!(
            "Loaded {} quads from {}",
            store.len().unwrap_or_default(),
            path.display()
        );
        Ok(Self::from_store(store))
    }

    /// Evaluates a [SPARQL query](https://www.w3.org/TR/sparql11-query/) and passes the results
    /// to `consume`.
    ///
    /// The results are lazily computed: `consume` runs while the dataset is locked for reading
    /// and must read everything it needs from them before returning.
    pub async fn query<T, F>(
        &self,
        query: spargebra::Query,
        consume: F,
    ) -> Result<T, ExecutionError>
    where
        F: FnOnce(QueryResults) -> T + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let query = Query::from(query);
        let result = task::spawn_blocking(move || {
            let store = inner.blocking_read();
            store.query(query).map(consume)
        })
        .await??;
        Ok(result)
    }

    /// Executes a [SPARQL update](https://www.w3.org/TR/sparql11-update/).
    ///
    /// The dataset is locked for writing until all the operations of the update are applied.
    pub async fn update(&self, update: spargebra::Update) -> Result<(), ExecutionError> {
        let inner = Arc::clone(&self.inner);
        let update = Update::from(update);
        task::spawn_blocking(move || inner.blocking_write().update(update)).await??;
        Ok(())
    }

    /// Returns the number of quads in the dataset.
    pub async fn len(&self) -> Result<usize, ExecutionError> {
        let inner = Arc::clone(&self.inner);
        let len = task::spawn_blocking(move || {
            inner
                .blocking_read()
                .len()
                .map_err(EvaluationError::from)
        })
        .await??;
        Ok(len)
    }

    /// Returns whether the dataset is empty.
    pub async fn is_empty(&self) -> Result<bool, ExecutionError> {
        Ok(self.len().await? == 0)
    }
}
