//! Live collection handle.

use crate::backend::Backend;
use crate::collection::batch::{Batch, UpdateOrder};
use crate::collection::query::{Query, QueryResult};
use crate::error::{CoreError, CoreResult};
use crate::operation::Operation;
use crate::schema::Schema;
use jotdb_storage::{CollectionState, Document, DocumentId};
use std::fmt;
use std::sync::Arc;

/// A named, independently id-sequenced table of documents.
///
/// The handle caches the collection state in memory, but the backend is
/// the source of truth: every operation refreshes the cache from the
/// backend before acting, and every mutation writes the whole store back.
/// Two handles on the same identifier therefore see each other's writes,
/// and the last writer wins.
///
/// Operations take `&mut self`; a handle must not be shared between
/// threads without external synchronization.
///
/// # Example
///
/// ```rust
/// use jotdb_core::{Database, Query, UpdateOrder};
/// use serde_json::json;
///
/// let db = Database::open_in_memory();
/// let mut todos = db.collection("todos")?;
///
/// let doc = json!({"title": "write docs", "done": false});
/// let ids = todos.insert(doc.as_object().cloned().unwrap())?;
///
/// let patch = json!({"done": true});
/// todos.update(UpdateOrder::new(ids[0], patch.as_object().cloned().unwrap()))?;
///
/// let page = todos.query(Query::new().limit(10))?;
/// assert_eq!(page.docs[0]["done"], json!(true));
/// # Ok::<(), jotdb_core::CoreError>(())
/// ```
pub struct Collection {
    pub(crate) identifier: String,
    pub(crate) schema: Schema,
    pub(crate) memory: CollectionState,
    pub(crate) backend: Arc<dyn Backend>,
}

impl Collection {
    /// Opens a collection on a backend, creating it if the backend does
    /// not know the identifier yet.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingArgument`] for an empty identifier, or any
    /// error raised by the backend's `create`.
    pub fn open(
        identifier: impl Into<String>,
        schema: Schema,
        backend: Arc<dyn Backend>,
    ) -> CoreResult<Self> {
        let identifier = identifier.into();
        if identifier.is_empty() {
            return Err(CoreError::missing_argument("identifier"));
        }

        let mut collection = Self {
            identifier,
            schema,
            memory: CollectionState::new(),
            backend,
        };

        let backend = Arc::clone(&collection.backend);
        backend.create(&mut collection)?;
        Ok(collection)
    }

    /// Returns the collection identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the collection schema.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the cached state as of the last refresh.
    ///
    /// This may be stale; operations never rely on it.
    #[must_use]
    pub fn memory(&self) -> &CollectionState {
        &self.memory
    }

    /// Returns the backend.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Replaces the cached state with the backend's current state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or no longer holds
    /// the collection.
    pub fn refresh(&mut self) -> CoreResult<()> {
        self.memory = crate::collection::defaults::refresh(&*self.backend, &self.identifier)?;
        Ok(())
    }

    /// Inserts one or more documents.
    ///
    /// Each document is stamped with an `id` field holding its new
    /// identifier. Returns the identifiers in input order.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingArgument`] for an empty batch, a schema
    /// violation on strict backends, or a storage error.
    pub fn insert(&mut self, docs: impl Into<Batch<Document>>) -> CoreResult<Vec<DocumentId>> {
        let docs = docs.into().require("documents")?;
        let backend = Arc::clone(&self.backend);
        backend.insert(self, docs)
    }

    /// Returns the documents with the given ids, in request order.
    ///
    /// Ids that do not exist are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingArgument`] for an empty batch or a
    /// storage error.
    pub fn get(&mut self, ids: impl Into<Batch<DocumentId>>) -> CoreResult<Vec<Document>> {
        let ids = ids.into().require("ids")?;
        let backend = Arc::clone(&self.backend);
        backend.get(self, ids)
    }

    /// Removes the documents with the given ids.
    ///
    /// Ids that do not exist are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingArgument`] for an empty batch or a
    /// storage error.
    pub fn remove(&mut self, ids: impl Into<Batch<DocumentId>>) -> CoreResult<()> {
        let ids = ids.into().require("ids")?;
        let backend = Arc::clone(&self.backend);
        backend.remove(self, ids)
    }

    /// Applies update orders.
    ///
    /// Each order overwrites the listed fields of its document and leaves
    /// the others untouched. Orders for missing ids are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingArgument`] for an empty batch, a schema
    /// violation on strict backends, or a storage error.
    pub fn update(&mut self, orders: impl Into<Batch<UpdateOrder>>) -> CoreResult<()> {
        let orders = orders.into().require("orders")?;
        let backend = Arc::clone(&self.backend);
        backend.update(self, orders)
    }

    /// Runs a filtered, paginated scan.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn query(&mut self, query: Query<'_>) -> CoreResult<QueryResult> {
        let backend = Arc::clone(&self.backend);
        backend.query(self, &query)
    }

    /// Returns the number of documents.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn count(&mut self) -> CoreResult<usize> {
        let backend = Arc::clone(&self.backend);
        backend.count(self)
    }

    /// Removes every document accepted by `predicate`, returning their ids.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn remove_where<F>(&mut self, predicate: F) -> CoreResult<Vec<DocumentId>>
    where
        F: Fn(&Document) -> bool,
    {
        let backend = Arc::clone(&self.backend);
        backend.remove_where(self, &predicate)
    }

    /// Merges `data` into every document accepted by `predicate`, returning
    /// their ids.
    ///
    /// # Errors
    ///
    /// Returns a schema violation on strict backends or a storage error.
    pub fn update_where<F>(&mut self, predicate: F, data: Document) -> CoreResult<Vec<DocumentId>>
    where
        F: Fn(&Document) -> bool,
    {
        let backend = Arc::clone(&self.backend);
        backend.update_where(self, &predicate, data)
    }

    /// Runs the read-apply-write cycle for staged operations.
    ///
    /// Returns the ids allocated by insert operations. An empty batch still
    /// refreshes the cache and rewrites the store.
    ///
    /// # Errors
    ///
    /// Returns a storage error, or [`CoreError::CollectionNotFound`] if the
    /// backend no longer holds the collection.
    pub fn sync(&mut self, operations: impl Into<Batch<Operation>>) -> CoreResult<Vec<DocumentId>> {
        let operations = operations.into().into_vec();
        let backend = Arc::clone(&self.backend);
        backend.sync(self, operations)
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("identifier", &self.identifier)
            .field("schema", &self.schema)
            .field("cached_documents", &self.memory.len())
            .finish_non_exhaustive()
    }
}
