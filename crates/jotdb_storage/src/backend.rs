//! Storage backend trait definition.

use crate::error::StorageResult;
use crate::model::StoreFile;

/// A storage backend for JotDB.
///
/// Backends hold one [`StoreFile`] and exchange it whole: every read returns
/// the complete store and every write replaces it. The collection engine owns
/// all interpretation of the store's contents.
///
/// # Invariants
///
/// - `read` returns a structurally valid store on every call, including the
///   first one against a fresh medium
/// - after `write(f)` returns, a subsequent `read` observes exactly `f`
/// - a partially written store is never observable
/// - Backends must be `Send + Sync` so handles can be shared
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing and ephemeral stores
/// - [`super::FileBackend`] - For persistent storage in a JSON file
pub trait StorageBackend: Send + Sync {
    /// Reads the full store.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be read or does not hold a
    /// valid store.
    fn read(&self) -> StorageResult<StoreFile>;

    /// Replaces the full store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be serialized or persisted.
    fn write(&self, file: &StoreFile) -> StorageResult<()>;
}
