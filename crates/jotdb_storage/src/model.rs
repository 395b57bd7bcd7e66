//! Persisted data model.
//!
//! Every backend stores a single [`StoreFile`]:
//!
//! ```text
//! {
//!   "collections": {
//!     "<identifier>": {
//!       "id": <next document id>,
//!       "documents": { "<id>": { "id": <id>, ... } }
//!     }
//!   }
//! }
//! ```
//!
//! Maps are ordered, so the serialized form is deterministic and documents
//! iterate in id order, which is also insertion order.

use crate::error::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// An open-shaped JSON record.
pub type Document = Map<String, Value>;

/// Field stamped onto every document on insert.
pub const ID_FIELD: &str = "id";

/// Identifier of a document within its collection.
///
/// Identifiers are allocated from a per-collection counter starting at 1.
/// They are monotonically increasing and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub u64);

impl DocumentId {
    /// The first identifier handed out by a fresh collection.
    pub const FIRST: Self = Self(1);

    /// Creates a document ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the identifier that follows this one, or `None` at the end
    /// of the id space.
    #[must_use]
    pub const fn checked_next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(next) => Some(Self(next)),
            None => None,
        }
    }
}

impl From<u64> for DocumentId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc:{}", self.0)
    }
}

/// Persisted state of one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionState {
    /// Next identifier to allocate.
    #[serde(rename = "id")]
    pub next_id: DocumentId,
    /// Documents keyed by identifier.
    #[serde(default)]
    pub documents: BTreeMap<DocumentId, Document>,
}

impl Default for CollectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionState {
    /// Creates the state of a freshly created collection.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: DocumentId::FIRST,
            documents: BTreeMap::new(),
        }
    }

    /// Allocates the next document identifier.
    ///
    /// Returns `None` once the counter cannot advance; the state is left
    /// unchanged.
    pub fn allocate_id(&mut self) -> Option<DocumentId> {
        let id = self.next_id;
        self.next_id = id.checked_next()?;
        Some(id)
    }

    /// Returns how many more identifiers can be allocated.
    #[must_use]
    pub const fn remaining_ids(&self) -> u64 {
        u64::MAX - self.next_id.0
    }

    /// Returns the document with the given id.
    #[must_use]
    pub fn get(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(&id)
    }

    /// Returns true if a document with the given id exists.
    #[must_use]
    pub fn contains(&self, id: DocumentId) -> bool {
        self.documents.contains_key(&id)
    }

    /// Returns the number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if the collection holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Root container persisted by a backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreFile {
    /// Collection states keyed by identifier.
    #[serde(default)]
    pub collections: BTreeMap<String, CollectionState>,
}

impl StoreFile {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the state of a collection.
    #[must_use]
    pub fn collection(&self, identifier: &str) -> Option<&CollectionState> {
        self.collections.get(identifier)
    }

    /// Returns true if the collection exists.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.collections.contains_key(identifier)
    }

    /// Decodes a store from its JSON form.
    ///
    /// An empty input decodes to an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Corrupted`] if the bytes are not a valid store.
    pub fn from_json(bytes: &[u8]) -> StorageResult<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::new());
        }
        serde_json::from_slice(bytes)
            .map_err(|e| StorageError::corrupted(format!("invalid store document: {e}")))
    }

    /// Encodes the store to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self, pretty: bool) -> StorageResult<Vec<u8>> {
        let bytes = if pretty {
            serde_json::to_vec_pretty(self)?
        } else {
            serde_json::to_vec(self)?
        };
        Ok(bytes)
    }
}
