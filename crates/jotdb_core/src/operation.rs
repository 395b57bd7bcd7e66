//! Staged collection mutations.
//!
//! Mutating collection operations never touch the cached state directly.
//! They produce [`Operation`] values which the sync cycle applies, with
//! [`apply`], to a freshly read snapshot of the collection.

use crate::error::{CoreError, CoreResult};
use jotdb_storage::{CollectionState, Document, DocumentId, ID_FIELD};
use serde_json::Value;

/// A single staged mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Allocate the next id, stamp it on the document and store it.
    Insert {
        /// The document to store.
        doc: Document,
    },
    /// Remove a document. Missing ids are ignored.
    Delete {
        /// The document to remove.
        id: DocumentId,
    },
    /// Overwrite fields of a document, key by key. Missing ids are ignored.
    Merge {
        /// The document to modify.
        id: DocumentId,
        /// Fields to overwrite.
        fields: Document,
    },
}

/// Applies operations to a collection state, in order.
///
/// Returns the ids allocated by [`Operation::Insert`], in order. A merge
/// never changes the `id` field of its target.
///
/// # Errors
///
/// Returns [`CoreError::InvalidOperation`] if the inserts would exhaust the
/// collection's id space. The state is left untouched in that case.
pub fn apply<I>(state: &mut CollectionState, operations: I) -> CoreResult<Vec<DocumentId>>
where
    I: IntoIterator<Item = Operation>,
{
    let operations: Vec<_> = operations.into_iter().collect();

    let inserts = operations
        .iter()
        .filter(|op| matches!(op, Operation::Insert { .. }))
        .count();
    if inserts as u64 > state.remaining_ids() {
        return Err(CoreError::invalid_operation(format!(
            "cannot allocate {inserts} ids: next id is {}",
            state.next_id.as_u64()
        )));
    }

    let mut inserted = Vec::with_capacity(inserts);

    for operation in operations {
        match operation {
            Operation::Insert { mut doc } => {
                let id = state
                    .allocate_id()
                    .ok_or_else(|| CoreError::invalid_operation("document id space exhausted"))?;
                doc.insert(ID_FIELD.to_owned(), Value::from(id.as_u64()));
                state.documents.insert(id, doc);
                inserted.push(id);
            }
            Operation::Delete { id } => {
                state.documents.remove(&id);
            }
            Operation::Merge { id, fields } => {
                if let Some(target) = state.documents.get_mut(&id) {
                    for (key, value) in fields {
                        if key != ID_FIELD {
                            target.insert(key, value);
                        }
                    }
                }
            }
        }
    }

    Ok(inserted)
}
