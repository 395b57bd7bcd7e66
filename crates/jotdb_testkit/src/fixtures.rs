//! Test fixtures and database helpers.
//!
//! Provides convenience functions for setting up test databases
//! and common test scenarios.

use jotdb_core::{Config, Database, Document};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Name of the store file inside a file fixture's temporary directory.
pub const STORE_FILE: &str = "store.json";

/// A test database with automatic cleanup.
pub struct TestDatabase {
    /// The database instance.
    pub db: Database,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: Option<TempDir>,
}

impl TestDatabase {
    /// Creates a new in-memory test database.
    pub fn memory() -> Self {
        Self {
            db: Database::open_in_memory(),
            temp_dir: None,
        }
    }

    /// Creates a new file-based test database.
    pub fn file() -> Self {
        Self::file_with_config(Config::default().sync_on_write(false))
    }

    /// Creates a new file-based test database with schema validation.
    pub fn strict() -> Self {
        Self::file_with_config(Config::default().sync_on_write(false).strict_schema(true))
    }

    /// Creates a new file-based test database with custom configuration.
    pub fn file_with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db = Database::open_with_config(&temp_dir.path().join(STORE_FILE), config)
            .expect("Failed to open file database");

        Self {
            db,
            temp_dir: Some(temp_dir),
        }
    }

    /// Returns the store path if file-based, None if in-memory.
    pub fn path(&self) -> Option<PathBuf> {
        self.temp_dir.as_ref().map(|d| d.path().join(STORE_FILE))
    }

    /// Opens a second database on the same store file.
    ///
    /// # Panics
    ///
    /// Panics for in-memory databases.
    pub fn reopen(&self) -> Database {
        let path = self.path().expect("Only file databases can be reopened");
        Database::open_with_config(&path, self.db.config().clone())
            .expect("Failed to reopen file database")
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

/// Runs a test with a temporary in-memory database.
///
/// # Example
///
/// ```rust
/// use jotdb_testkit::with_temp_db;
///
/// with_temp_db(|db| {
///     let col = db.collection("test").unwrap();
///     assert_eq!(col.identifier(), "test");
/// });
/// ```
pub fn with_temp_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database) -> R,
{
    let test_db = TestDatabase::memory();
    f(&test_db.db)
}

/// Runs a test with a temporary file-based database.
pub fn with_file_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database, &Path) -> R,
{
    let test_db = TestDatabase::file();
    let path = test_db.path().expect("File database should have a path");
    f(&test_db.db, &path)
}

/// Converts a JSON object literal into a document.
///
/// # Panics
///
/// Panics if `value` is not an object.
pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("Expected a JSON object, got {other}"),
    }
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use jotdb_core::Collection;
    use serde_json::json;

    /// Creates a collection holding `count` documents `{index: i}`.
    pub fn populated_collection(db: &Database, name: &str, count: usize) -> Collection {
        let mut collection = db.collection(name).expect("Failed to open collection");
        if count > 0 {
            let docs: Vec<_> = (0..count).map(|i| doc(json!({ "index": i }))).collect();
            collection.insert(docs).expect("Failed to insert documents");
        }
        collection
    }

    /// Creates a database with multiple populated collections.
    pub fn multi_collection_database(collection_count: usize) -> (TestDatabase, Vec<String>) {
        let test_db = TestDatabase::memory();
        let mut names = Vec::with_capacity(collection_count);

        for i in 0..collection_count {
            let name = format!("collection_{i}");
            populated_collection(&test_db, &name, 1);
            names.push(name);
        }

        (test_db, names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_database() {
        let test_db = TestDatabase::memory();
        assert!(test_db.path().is_none());
        assert!(test_db.collection("test").is_ok());
    }

    #[test]
    fn test_file_database_reopen() {
        let test_db = TestDatabase::file();
        let path = test_db.path().unwrap();
        assert!(path.exists());

        test_db
            .collection("test")
            .unwrap()
            .insert(doc(json!({"value": "a"})))
            .unwrap();

        let again = test_db.reopen();
        assert_eq!(again.collection("test").unwrap().count().unwrap(), 1);
    }

    #[test]
    fn test_strict_database() {
        let test_db = TestDatabase::strict();
        assert!(test_db.config().strict_schema);
        assert!(test_db.collection("loose").is_err());
    }

    #[test]
    fn test_with_temp_db() {
        with_temp_db(|db| {
            db.collection("test").unwrap();
            assert_eq!(db.collections().unwrap(), vec!["test"]);
        });
    }

    #[test]
    fn test_with_file_db() {
        with_file_db(|db, path| {
            db.collection("test").unwrap();
            let raw = std::fs::read_to_string(path).unwrap();
            assert!(raw.contains("\"test\""));
        });
    }

    #[test]
    fn test_populated_scenario() {
        let test_db = TestDatabase::memory();
        let mut col = scenarios::populated_collection(&test_db, "test", 10);
        assert_eq!(col.count().unwrap(), 10);
    }

    #[test]
    fn test_multi_collection_scenario() {
        let (test_db, names) = scenarios::multi_collection_database(3);
        assert_eq!(test_db.collections().unwrap(), names);
    }
}
