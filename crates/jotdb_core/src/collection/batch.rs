//! Operation inputs: single values or sequences.

use crate::error::{CoreError, CoreResult};
use crate::operation::Operation;
use jotdb_storage::{Document, DocumentId};

/// One or many inputs to a collection operation.
///
/// Operations accept anything convertible into a batch, so a single
/// document, id or order can be passed as well as a `Vec`, slice or array.
///
/// ```rust
/// use jotdb_core::{Batch, DocumentId};
///
/// let one: Batch<DocumentId> = DocumentId::new(1).into();
/// let many: Batch<DocumentId> = vec![DocumentId::new(1), DocumentId::new(2)].into();
/// assert_eq!(one.len(), 1);
/// assert_eq!(many.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T>(Vec<T>);

impl<T> Batch<T> {
    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the batch holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the items.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.0
    }

    /// Returns the items, failing if there are none.
    pub(crate) fn require(self, name: &str) -> CoreResult<Vec<T>> {
        if self.0.is_empty() {
            return Err(CoreError::missing_argument(name));
        }
        Ok(self.0)
    }
}

impl<T> From<Vec<T>> for Batch<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T: Clone> From<&[T]> for Batch<T> {
    fn from(items: &[T]) -> Self {
        Self(items.to_vec())
    }
}

impl<T, const N: usize> From<[T; N]> for Batch<T> {
    fn from(items: [T; N]) -> Self {
        Self(items.into())
    }
}

macro_rules! impl_single {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Batch<$ty> {
                fn from(item: $ty) -> Self {
                    Self(vec![item])
                }
            }
        )*
    };
}

impl_single!(Document, DocumentId, UpdateOrder, Operation);

impl From<u64> for Batch<DocumentId> {
    fn from(id: u64) -> Self {
        Self(vec![DocumentId::new(id)])
    }
}

impl From<Vec<u64>> for Batch<DocumentId> {
    fn from(ids: Vec<u64>) -> Self {
        Self(ids.into_iter().map(DocumentId::new).collect())
    }
}

impl<const N: usize> From<[u64; N]> for Batch<DocumentId> {
    fn from(ids: [u64; N]) -> Self {
        Self(ids.into_iter().map(DocumentId::new).collect())
    }
}

/// A request to overwrite fields of one document.
///
/// An order whose id is 0 or does not exist is skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOrder {
    /// The document to update.
    pub id: DocumentId,
    /// Fields to overwrite, key by key.
    pub data: Document,
}

impl UpdateOrder {
    /// Creates an update order.
    pub fn new(id: impl Into<DocumentId>, data: Document) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}
