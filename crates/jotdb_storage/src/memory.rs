//! In-memory storage backend.

use crate::backend::StorageBackend;
use crate::error::StorageResult;
use crate::model::StoreFile;
use parking_lot::RwLock;

/// An in-memory storage backend.
///
/// This backend keeps the store for the lifetime of the value and is
/// suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral databases that don't need persistence
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use jotdb_storage::{InMemoryBackend, StorageBackend, StoreFile};
///
/// let backend = InMemoryBackend::new();
/// assert!(backend.read().unwrap().collections.is_empty());
/// backend.write(&StoreFile::new()).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    file: RwLock<StoreFile>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend holding an existing store.
    ///
    /// Useful for seeding tests.
    #[must_use]
    pub fn with_file(file: StoreFile) -> Self {
        Self {
            file: RwLock::new(file),
        }
    }

    /// Returns a copy of the current store.
    #[must_use]
    pub fn snapshot(&self) -> StoreFile {
        self.file.read().clone()
    }

    /// Drops every collection.
    pub fn clear(&self) {
        *self.file.write() = StoreFile::new();
    }
}

impl StorageBackend for InMemoryBackend {
    fn read(&self) -> StorageResult<StoreFile> {
        Ok(self.file.read().clone())
    }

    fn write(&self, file: &StoreFile) -> StorageResult<()> {
        *self.file.write() = file.clone();
        Ok(())
    }
}
