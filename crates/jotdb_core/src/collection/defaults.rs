//! Default implementations of collection operations.
//!
//! [`Backend`](crate::Backend) dispatches here unless a backend overrides
//! an operation. Overrides may call these functions to reuse the default
//! behavior around their own logic.
//!
//! Every function re-reads the backend before acting; the cached state of
//! the handle is never trusted. Mutations are staged as
//! [`Operation`]s and executed by [`sync`], which re-reads once more, applies
//! them to the fresh state and writes the whole store back.

use crate::collection::batch::UpdateOrder;
use crate::collection::handle::Collection;
use crate::collection::query::{Predicate, Query, QueryResult};
use crate::error::{CoreError, CoreResult};
use crate::operation::{apply, Operation};
use jotdb_storage::{CollectionState, Document, DocumentId, StorageBackend, StoreFile};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Reads the authoritative state of a collection from a backend.
///
/// # Errors
///
/// Returns a storage error, or [`CoreError::CollectionNotFound`] if the
/// backend does not hold the collection.
pub fn refresh<B>(backend: &B, identifier: &str) -> CoreResult<CollectionState>
where
    B: StorageBackend + ?Sized,
{
    let mut file = backend.read()?;
    take_state(&mut file, identifier)
}

fn take_state(file: &mut StoreFile, identifier: &str) -> CoreResult<CollectionState> {
    file.collections.remove(identifier).ok_or_else(|| {
        warn!(collection = identifier, "collection missing from backend");
        CoreError::collection_not_found(identifier)
    })
}

/// Registers the collection, seeding an empty state if it is unknown.
///
/// An existing collection is left as is and nothing is written.
pub fn create(collection: &mut Collection) -> CoreResult<()> {
    let backend = Arc::clone(&collection.backend);
    let mut file = backend.read()?;

    match file.collection(&collection.identifier) {
        Some(state) => {
            collection.memory = state.clone();
        }
        None => {
            let state = CollectionState::new();
            file.collections
                .insert(collection.identifier.clone(), state.clone());
            backend.write(&file)?;
            debug!(collection = %collection.identifier, "created collection");
            collection.memory = state;
        }
    }

    Ok(())
}

/// Stages one insert per document and syncs.
pub fn insert(collection: &mut Collection, docs: Vec<Document>) -> CoreResult<Vec<DocumentId>> {
    let operations = docs
        .into_iter()
        .map(|doc| Operation::Insert { doc })
        .collect::<Vec<_>>();
    collection.sync(operations)
}

/// Returns the existing documents among `ids`, in request order.
pub fn get(collection: &mut Collection, ids: Vec<DocumentId>) -> CoreResult<Vec<Document>> {
    collection.refresh()?;
    Ok(ids
        .into_iter()
        .filter_map(|id| collection.memory.get(id).cloned())
        .collect())
}

/// Stages a delete for every existing id and syncs.
pub fn remove(collection: &mut Collection, ids: Vec<DocumentId>) -> CoreResult<()> {
    collection.refresh()?;

    let operations = ids
        .into_iter()
        .filter(|id| collection.memory.contains(*id))
        .map(|id| Operation::Delete { id })
        .collect::<Vec<_>>();

    collection.sync(operations)?;
    Ok(())
}

/// Stages a merge for every order targeting an existing id and syncs.
pub fn update(collection: &mut Collection, orders: Vec<UpdateOrder>) -> CoreResult<()> {
    collection.refresh()?;

    let mut operations = Vec::with_capacity(orders.len());
    for order in orders {
        if order.id.as_u64() == 0 || !collection.memory.contains(order.id) {
            trace!(collection = %collection.identifier, id = %order.id, "skipping update order");
            continue;
        }
        operations.push(Operation::Merge {
            id: order.id,
            fields: order.data,
        });
    }

    collection.sync(operations)?;
    Ok(())
}

/// Runs a query against the current state.
pub fn query(collection: &mut Collection, query: &Query<'_>) -> CoreResult<QueryResult> {
    collection.refresh()?;
    Ok(query.run(collection.memory.documents.values()))
}

/// Counts the documents in the current state.
pub fn count(collection: &mut Collection) -> CoreResult<usize> {
    collection.refresh()?;
    Ok(collection.memory.len())
}

/// Stages a delete for every document accepted by `predicate` and syncs.
pub fn remove_where(
    collection: &mut Collection,
    predicate: &Predicate<'_>,
) -> CoreResult<Vec<DocumentId>> {
    collection.refresh()?;
    let ids = matching_ids(&collection.memory, predicate);

    let operations = ids
        .iter()
        .map(|&id| Operation::Delete { id })
        .collect::<Vec<_>>();
    collection.sync(operations)?;

    Ok(ids)
}

/// Stages a merge of `data` into every document accepted by `predicate`
/// and syncs.
pub fn update_where(
    collection: &mut Collection,
    predicate: &Predicate<'_>,
    data: Document,
) -> CoreResult<Vec<DocumentId>> {
    collection.refresh()?;
    let ids = matching_ids(&collection.memory, predicate);

    let operations = ids
        .iter()
        .map(|&id| Operation::Merge {
            id,
            fields: data.clone(),
        })
        .collect::<Vec<_>>();
    collection.sync(operations)?;

    Ok(ids)
}

fn matching_ids(state: &CollectionState, predicate: &Predicate<'_>) -> Vec<DocumentId> {
    state
        .documents
        .iter()
        .filter(|(_, doc)| predicate(doc))
        .map(|(&id, _)| id)
        .collect()
}

/// Runs the read-apply-write cycle.
///
/// 1. read the full store
/// 2. replace the cached state with the collection's stored state
/// 3. apply the operations in order
/// 4. put the state back into the store
/// 5. write the full store
///
/// Nothing guards the window between the read and the write: a concurrent
/// writer on the same medium is overwritten. If applying fails, nothing is
/// written.
pub fn sync(collection: &mut Collection, operations: Vec<Operation>) -> CoreResult<Vec<DocumentId>> {
    let backend = Arc::clone(&collection.backend);

    let mut file = backend.read()?;
    collection.memory = take_state(&mut file, &collection.identifier)?;

    let staged = operations.len();
    let inserted = apply(&mut collection.memory, operations)?;

    file.collections
        .insert(collection.identifier.clone(), collection.memory.clone());
    backend.write(&file)?;

    debug!(
        collection = %collection.identifier,
        staged,
        inserted = inserted.len(),
        "synced collection"
    );
    Ok(inserted)
}
