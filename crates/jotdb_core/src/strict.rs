//! Schema-validating backend.

use crate::backend::Backend;
use crate::collection::{defaults, Collection, Predicate, UpdateOrder};
use crate::error::{CoreError, CoreResult};
use jotdb_storage::{
    Document, DocumentId, FileBackend, FileOptions, StorageBackend, StorageResult, StoreFile,
};
use std::path::Path;
use tracing::debug;

/// A backend that validates documents against the collection schema.
///
/// Inserted documents and update data are checked before anything is read
/// or written; a violation leaves the store untouched. Collections opened on
/// a strict backend must carry a non-empty schema.
///
/// Storage is delegated to the wrapped backend, a JSON file by default.
///
/// ```rust
/// use jotdb_core::{Collection, Schema, StrictBackend};
/// use jotdb_storage::InMemoryBackend;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let backend = Arc::new(StrictBackend::new(InMemoryBackend::new()));
/// let schema = Schema::object([("value", Schema::string())]);
/// let mut col = Collection::open("strings", schema, backend)?;
///
/// let bad = json!({"value": 9999}).as_object().cloned().unwrap();
/// assert!(col.insert(bad).is_err());
/// # Ok::<(), jotdb_core::CoreError>(())
/// ```
#[derive(Debug)]
pub struct StrictBackend<B = FileBackend> {
    inner: B,
}

impl<B: StorageBackend> StrictBackend<B> {
    /// Wraps a storage backend.
    pub const fn new(inner: B) -> Self {
        Self { inner }
    }

    /// Returns the wrapped backend.
    pub const fn inner(&self) -> &B {
        &self.inner
    }

    /// Unwraps the storage backend.
    pub fn into_inner(self) -> B {
        self.inner
    }
}

impl StrictBackend<FileBackend> {
    /// Opens a strict backend over a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn open(path: &Path) -> CoreResult<Self> {
        Ok(Self::new(FileBackend::open(path)?))
    }

    /// Opens a strict backend over a JSON file with custom write options.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn open_with_options(path: &Path, options: FileOptions) -> CoreResult<Self> {
        Ok(Self::new(FileBackend::open_with_options(path, options)?))
    }
}

fn check(collection: &Collection, doc: &Document) -> CoreResult<()> {
    collection.schema().validate(doc).map_err(|err| {
        debug!(collection = collection.identifier(), error = %err, "document rejected");
        CoreError::from(err)
    })
}

impl<B: StorageBackend> StorageBackend for StrictBackend<B> {
    fn read(&self) -> StorageResult<StoreFile> {
        self.inner.read()
    }

    fn write(&self, file: &StoreFile) -> StorageResult<()> {
        self.inner.write(file)
    }
}

impl<B: StorageBackend> Backend for StrictBackend<B> {
    fn create(&self, collection: &mut Collection) -> CoreResult<()> {
        if collection.schema().is_empty() {
            return Err(CoreError::missing_argument("schema"));
        }
        defaults::create(collection)
    }

    fn insert(&self, collection: &mut Collection, docs: Vec<Document>) -> CoreResult<Vec<DocumentId>> {
        for doc in &docs {
            check(collection, doc)?;
        }
        defaults::insert(collection, docs)
    }

    fn update(&self, collection: &mut Collection, orders: Vec<UpdateOrder>) -> CoreResult<()> {
        for order in &orders {
            check(collection, &order.data)?;
        }
        defaults::update(collection, orders)
    }

    fn update_where(
        &self,
        collection: &mut Collection,
        predicate: &Predicate<'_>,
        data: Document,
    ) -> CoreResult<Vec<DocumentId>> {
        check(collection, &data)?;
        defaults::update_where(collection, predicate, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Schema, SchemaError};
    use jotdb_storage::InMemoryBackend;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().expect("object")
    }

    fn value_schema() -> Schema {
        Schema::object([("value", Schema::string())])
    }

    fn strict_memory() -> Arc<StrictBackend<InMemoryBackend>> {
        Arc::new(StrictBackend::new(InMemoryBackend::new()))
    }

    #[test]
    fn rejects_mismatched_insert_and_stores_nothing() {
        let backend = strict_memory();
        let mut col = Collection::open("col", value_schema(), backend.clone()).unwrap();
        let before = backend.inner().snapshot();

        let err = col.insert(doc(json!({"value": 9999}))).unwrap_err();
        assert!(matches!(
            err,
            CoreError::SchemaViolation(SchemaError::TypeMismatch { ref key, .. }) if key == "value"
        ));
        assert_eq!(backend.inner().snapshot(), before);
        assert_eq!(col.count().unwrap(), 0);
    }

    #[test]
    fn accepts_matching_insert() {
        let backend = strict_memory();
        let mut col = Collection::open("col", value_schema(), backend).unwrap();

        let ids = col.insert(doc(json!({"value": "a"}))).unwrap();
        assert_eq!(ids, vec![DocumentId::new(1)]);
    }

    #[test]
    fn one_bad_document_rejects_the_batch() {
        let backend = strict_memory();
        let mut col = Collection::open("col", value_schema(), backend).unwrap();

        let err = col
            .insert([doc(json!({"value": "ok"})), doc(json!({"other": "x"}))])
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::SchemaViolation(SchemaError::UnknownKey { ref key }) if key == "other"
        ));
        assert_eq!(col.count().unwrap(), 0);
    }

    #[test]
    fn validates_update_data() {
        let backend = strict_memory();
        let mut col = Collection::open("col", value_schema(), backend).unwrap();
        col.insert(doc(json!({"value": "a"}))).unwrap();

        let err = col
            .update(UpdateOrder::new(1_u64, doc(json!({"value": false}))))
            .unwrap_err();
        assert!(matches!(err, CoreError::SchemaViolation(_)));

        col.update(UpdateOrder::new(1_u64, doc(json!({"value": "b"}))))
            .unwrap();
        assert_eq!(
            col.get(1_u64).unwrap(),
            vec![doc(json!({"id": 1, "value": "b"}))]
        );
    }

    #[test]
    fn validates_update_where_data() {
        let backend = strict_memory();
        let mut col = Collection::open("col", value_schema(), backend).unwrap();
        col.insert(doc(json!({"value": "a"}))).unwrap();

        let err = col
            .update_where(|_| true, doc(json!({"value": 1})))
            .unwrap_err();
        assert!(matches!(err, CoreError::SchemaViolation(_)));
    }

    #[test]
    fn array_elements_are_checked() {
        let backend = strict_memory();
        let schema = Schema::object([("tags", Schema::list(Schema::string()))]);
        let mut col = Collection::open("col", schema, backend).unwrap();

        col.insert(doc(json!({"tags": ["a", "b"]}))).unwrap();
        let err = col.insert(doc(json!({"tags": ["a", 2]}))).unwrap_err();
        assert!(matches!(
            err,
            CoreError::SchemaViolation(SchemaError::ArrayElementMismatch { index: 1, .. })
        ));
    }

    #[test]
    fn empty_schema_is_missing_argument() {
        let backend = strict_memory();
        let err = Collection::open("col", Schema::default(), backend.clone()).unwrap_err();
        assert!(matches!(err, CoreError::MissingArgument { ref name } if name == "schema"));
        assert!(!backend.inner().snapshot().contains("col"));
    }

    #[test]
    fn removal_and_queries_are_not_validated() {
        let backend = strict_memory();
        let mut col = Collection::open("col", value_schema(), backend).unwrap();
        col.insert([doc(json!({"value": "a"})), doc(json!({"value": "b"}))])
            .unwrap();

        col.remove(1_u64).unwrap();
        assert_eq!(col.count().unwrap(), 1);
    }

    #[test]
    fn file_backed_strict_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("strict.json");

        {
            let backend = Arc::new(StrictBackend::open(&path).unwrap());
            let mut col = Collection::open("col", value_schema(), backend).unwrap();
            col.insert(doc(json!({"value": "kept"}))).unwrap();
            assert!(col.insert(doc(json!({"value": 1}))).is_err());
        }

        let backend = Arc::new(StrictBackend::open(&path).unwrap());
        let mut col = Collection::open("col", value_schema(), backend).unwrap();
        assert_eq!(col.count().unwrap(), 1);
    }
}
