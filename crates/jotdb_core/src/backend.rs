//! Backends with per-operation overrides.

use crate::collection::{defaults, Collection, Predicate, Query, QueryResult, UpdateOrder};
use crate::error::CoreResult;
use crate::operation::Operation;
use jotdb_storage::{Document, DocumentId, FileBackend, InMemoryBackend, StorageBackend};

/// A storage backend as seen by the collection engine.
///
/// Every collection operation is dispatched through its backend. The
/// provided methods run the engine's default implementation from
/// [`defaults`]; a backend overrides an operation simply by implementing the
/// method, and may still call the default before or after its own logic.
///
/// Inputs arrive already normalized: batches are non-empty and the
/// identifier is valid.
///
/// # Example
///
/// ```rust
/// use jotdb_core::{defaults, Backend, Collection, CoreResult, Document, DocumentId};
/// use jotdb_storage::{InMemoryBackend, StorageBackend, StorageResult, StoreFile};
///
/// /// Refuses empty documents, otherwise behaves like memory storage.
/// struct NoEmptyDocs(InMemoryBackend);
///
/// impl StorageBackend for NoEmptyDocs {
///     fn read(&self) -> StorageResult<StoreFile> { self.0.read() }
///     fn write(&self, file: &StoreFile) -> StorageResult<()> { self.0.write(file) }
/// }
///
/// impl Backend for NoEmptyDocs {
///     fn insert(&self, collection: &mut Collection, docs: Vec<Document>) -> CoreResult<Vec<DocumentId>> {
///         let docs = docs.into_iter().filter(|d| !d.is_empty()).collect();
///         defaults::insert(collection, docs)
///     }
/// }
/// ```
pub trait Backend: StorageBackend {
    /// Registers the collection with the backend when a handle is opened.
    fn create(&self, collection: &mut Collection) -> CoreResult<()> {
        defaults::create(collection)
    }

    /// Inserts documents, returning their new ids.
    fn insert(&self, collection: &mut Collection, docs: Vec<Document>) -> CoreResult<Vec<DocumentId>> {
        defaults::insert(collection, docs)
    }

    /// Returns the documents that exist, in request order.
    fn get(&self, collection: &mut Collection, ids: Vec<DocumentId>) -> CoreResult<Vec<Document>> {
        defaults::get(collection, ids)
    }

    /// Removes the documents that exist.
    fn remove(&self, collection: &mut Collection, ids: Vec<DocumentId>) -> CoreResult<()> {
        defaults::remove(collection, ids)
    }

    /// Applies update orders.
    fn update(&self, collection: &mut Collection, orders: Vec<UpdateOrder>) -> CoreResult<()> {
        defaults::update(collection, orders)
    }

    /// Runs a query.
    fn query(&self, collection: &mut Collection, query: &Query<'_>) -> CoreResult<QueryResult> {
        defaults::query(collection, query)
    }

    /// Counts documents.
    fn count(&self, collection: &mut Collection) -> CoreResult<usize> {
        defaults::count(collection)
    }

    /// Removes every document matching the predicate, returning their ids.
    fn remove_where(
        &self,
        collection: &mut Collection,
        predicate: &Predicate<'_>,
    ) -> CoreResult<Vec<DocumentId>> {
        defaults::remove_where(collection, predicate)
    }

    /// Merges `data` into every document matching the predicate, returning
    /// their ids.
    fn update_where(
        &self,
        collection: &mut Collection,
        predicate: &Predicate<'_>,
        data: Document,
    ) -> CoreResult<Vec<DocumentId>> {
        defaults::update_where(collection, predicate, data)
    }

    /// Runs the read-apply-write cycle for staged operations.
    fn sync(&self, collection: &mut Collection, operations: Vec<Operation>) -> CoreResult<Vec<DocumentId>> {
        defaults::sync(collection, operations)
    }
}

impl Backend for InMemoryBackend {}

impl Backend for FileBackend {}
