//! Error types for JotDB core.

use crate::schema::SchemaError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in JotDB core operations.
///
/// A document id that does not exist is never an error: `get`, `remove`
/// and `update` skip it.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] jotdb_storage::StorageError),

    /// A document did not match the collection schema.
    #[error("schema violation: {0}")]
    SchemaViolation(#[from] SchemaError),

    /// A required input was absent or empty.
    #[error("missing argument: {name}")]
    MissingArgument {
        /// Name of the missing input.
        name: String,
    },

    /// The backend no longer holds the collection.
    #[error("collection not found: {identifier}")]
    CollectionNotFound {
        /// Identifier of the collection.
        identifier: String,
    },

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates a missing argument error.
    pub fn missing_argument(name: impl Into<String>) -> Self {
        Self::MissingArgument { name: name.into() }
    }

    /// Creates a collection not found error.
    pub fn collection_not_found(identifier: impl Into<String>) -> Self {
        Self::CollectionNotFound {
            identifier: identifier.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }
}
