//! Database facade.

use crate::backend::Backend;
use crate::collection::Collection;
use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::schema::Schema;
use crate::strict::StrictBackend;
use jotdb_storage::{FileBackend, InMemoryBackend, StorageBackend};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// The main database handle.
///
/// A `Database` owns a backend and opens [`Collection`] handles on it. All
/// collections of a database share the backend, and therefore the store
/// file.
///
/// # Opening a Database
///
/// ```rust,no_run
/// use jotdb_core::{Config, Database};
/// use std::path::Path;
///
/// let db = Database::open(Path::new("data/store.json"))?;
/// let users = db.collection("users")?;
///
/// let config = Config::default().pretty(true).sync_on_write(false);
/// let scratch = Database::open_with_config(Path::new("scratch.json"), config)?;
/// # Ok::<(), jotdb_core::CoreError>(())
/// ```
///
/// # In-Memory Databases
///
/// For testing, use `Database::open_in_memory()`:
///
/// ```rust
/// let db = jotdb_core::Database::open_in_memory();
/// assert!(db.collections()?.is_empty());
/// # Ok::<(), jotdb_core::CoreError>(())
/// ```
pub struct Database {
    config: Config,
    backend: Arc<dyn Backend>,
}

impl Database {
    /// Opens a database stored in a JSON file, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or read.
    pub fn open(path: &Path) -> CoreResult<Self> {
        Self::open_with_config(path, Config::default())
    }

    /// Opens a database stored in a JSON file with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidOperation`] if the file does not exist and
    /// `create_if_missing` is false, or a storage error.
    pub fn open_with_config(path: &Path, config: Config) -> CoreResult<Self> {
        if !config.create_if_missing && !path.exists() {
            return Err(CoreError::invalid_operation(format!(
                "store {} does not exist and create_if_missing is false",
                path.display()
            )));
        }

        let file = FileBackend::open_with_options(path, config.file_options())?;
        // Reject a corrupted store at open.
        file.read()?;

        let backend: Arc<dyn Backend> = if config.strict_schema {
            Arc::new(StrictBackend::new(file))
        } else {
            Arc::new(file)
        };

        info!(
            path = %path.display(),
            strict = config.strict_schema,
            "opened database"
        );
        Ok(Self { config, backend })
    }

    /// Opens a database whose collections validate documents against their
    /// schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or read.
    pub fn open_strict(path: &Path) -> CoreResult<Self> {
        Self::open_with_config(path, Config::default().strict_schema(true))
    }

    /// Creates a database that lives only as long as the process.
    #[must_use]
    pub fn open_in_memory() -> Self {
        Self::with_backend(Arc::new(InMemoryBackend::new()))
    }

    /// Creates a database over any backend, including custom ones that
    /// override collection operations.
    #[must_use]
    pub fn with_backend(backend: Arc<dyn Backend>) -> Self {
        Self {
            config: Config::default(),
            backend,
        }
    }

    /// Opens a collection without a schema, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingArgument`] for an empty identifier, or on
    /// strict backends, which require a schema. Returns a storage error if
    /// the backend fails.
    pub fn collection(&self, identifier: &str) -> CoreResult<Collection> {
        self.collection_with_schema(identifier, Schema::default())
    }

    /// Opens a collection with a schema, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingArgument`] for an empty identifier or a
    /// storage error.
    pub fn collection_with_schema(&self, identifier: &str, schema: Schema) -> CoreResult<Collection> {
        Collection::open(identifier, schema, Arc::clone(&self.backend))
    }

    /// Returns the identifiers of all collections in the store, sorted.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn collections(&self) -> CoreResult<Vec<String>> {
        let file = self.backend.read()?;
        Ok(file.collections.into_keys().collect())
    }

    /// Returns the backend.
    #[must_use]
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
