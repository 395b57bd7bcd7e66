//! Cross-crate integration test helpers.
//!
//! Provides utilities for testing interactions between the JotDB
//! storage backends and the collection engine.

use crate::fixtures::doc;
use jotdb_core::{Collection, Database, Document, DocumentId, Query, UpdateOrder};
use jotdb_storage::StorageBackend;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// A test harness that mirrors a collection in a plain map.
///
/// Every mutation goes to both the collection and the model, so the two
/// can be compared at any point.
pub struct IntegrationHarness {
    /// The collection under test.
    pub collection: Collection,
    /// Expected contents by id.
    model: BTreeMap<DocumentId, Document>,
    /// Expected next id.
    next_id: u64,
}

impl IntegrationHarness {
    /// Creates a harness over a fresh collection of an in-memory database.
    pub fn new() -> Self {
        let db = Database::open_in_memory();
        Self::on(&db, "harness")
    }

    /// Creates a harness over a collection that must be empty.
    pub fn on(db: &Database, name: &str) -> Self {
        let collection = db.collection(name).expect("Failed to open collection");
        assert!(collection.memory().is_empty(), "Harness needs an empty collection");
        Self {
            collection,
            model: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Inserts documents and tracks them.
    pub fn insert(&mut self, docs: Vec<Document>) -> Vec<DocumentId> {
        let ids = self
            .collection
            .insert(docs.clone())
            .expect("Failed to insert documents");

        for (id, mut expected) in ids.iter().zip(docs) {
            assert_eq!(id.as_u64(), self.next_id, "Ids must be sequential");
            expected.insert("id".into(), Value::from(self.next_id));
            self.model.insert(*id, expected);
            self.next_id += 1;
        }
        ids
    }

    /// Removes documents and updates tracking.
    pub fn remove(&mut self, ids: Vec<DocumentId>) {
        self.collection
            .remove(ids.clone())
            .expect("Failed to remove documents");
        for id in ids {
            self.model.remove(&id);
        }
    }

    /// Applies update orders and updates tracking.
    pub fn update(&mut self, orders: Vec<UpdateOrder>) {
        self.collection
            .update(orders.clone())
            .expect("Failed to update documents");
        for order in orders {
            if let Some(target) = self.model.get_mut(&order.id) {
                target.extend(order.data.into_iter().filter(|(key, _)| key != "id"));
            }
        }
    }

    /// Verifies the collection matches the model.
    pub fn verify_all(&mut self) {
        let count = self.collection.count().expect("Failed to count");
        assert_eq!(count, self.model.len(), "Document count mismatch");

        let result = self
            .collection
            .query(Query::new().limit(usize::MAX))
            .expect("Failed to query");
        let expected: Vec<_> = self.model.values().cloned().collect();
        assert_eq!(result.docs, expected, "Collection contents mismatch");

        assert_eq!(
            self.collection.memory().next_id.as_u64(),
            self.next_id,
            "Next id mismatch"
        );
    }

    /// Returns the count of tracked documents.
    pub fn tracked_count(&self) -> usize {
        self.model.len()
    }
}

impl Default for IntegrationHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks of the engine's observable behavior, runnable against any
/// database.
pub mod checks {
    use super::*;

    /// Checks that an inserted document is stored with its id stamped.
    pub fn check_insert_round_trip(db: &Database) {
        let mut col = db.collection("round_trip").expect("Failed to open");
        col.insert(doc(json!({"value": "a"}))).expect("Failed to insert");

        let result = col.query(Query::new()).expect("Failed to query");
        assert_eq!(result.docs, vec![doc(json!({"id": 1, "value": "a"}))]);
        assert_eq!((result.offset, result.limit), (0, jotdb_core::DEFAULT_LIMIT));
    }

    /// Checks offset/limit slicing and echo.
    pub fn check_pagination(db: &Database) {
        let mut col = db.collection("pagination").expect("Failed to open");
        col.insert([
            doc(json!({"value": "a"})),
            doc(json!({"value": "b"})),
            doc(json!({"value": "c"})),
        ])
        .expect("Failed to insert");

        let result = col
            .query(Query::new().limit(2).offset(1))
            .expect("Failed to query");
        assert_eq!(
            result.docs,
            vec![
                doc(json!({"id": 2, "value": "b"})),
                doc(json!({"id": 3, "value": "c"})),
            ]
        );
        assert_eq!((result.offset, result.limit), (1, 2));
    }

    /// Checks that opening a collection twice keeps its data.
    pub fn check_idempotent_create(db: &Database) {
        let mut first = db.collection("idempotent").expect("Failed to open");
        first
            .insert(doc(json!({"value": "a"})))
            .expect("Failed to insert");

        let mut second = db.collection("idempotent").expect("Failed to reopen");
        assert_eq!(second.count().expect("Failed to count"), 1);
    }

    /// Checks that removal of missing ids is a no-op on the stored state.
    pub fn check_remove_missing_is_noop(db: &Database) {
        let mut col = db.collection("remove_missing").expect("Failed to open");
        col.insert(doc(json!({"value": "a"}))).expect("Failed to insert");
        let before = db.backend().read().expect("Failed to read");

        col.remove(999_u64).expect("Failed to remove");
        let after = db.backend().read().expect("Failed to read");
        assert_eq!(before, after);
    }

    /// Checks that update merges shallowly.
    pub fn check_shallow_merge(db: &Database) {
        let mut col = db.collection("merge").expect("Failed to open");
        col.insert(doc(json!({"value": "a", "another": "x", "nested": {"k": 1, "j": 2}})))
            .expect("Failed to insert");

        col.update(UpdateOrder::new(
            1_u64,
            doc(json!({"value": "c", "nested": {"k": 3}})),
        ))
        .expect("Failed to update");

        assert_eq!(
            col.get(1_u64).expect("Failed to get"),
            vec![doc(json!({"id": 1, "value": "c", "another": "x", "nested": {"k": 3}}))]
        );
    }

    /// Checks that identifiers never go back, even after removing
    /// everything.
    pub fn check_monotonic_ids(db: &Database) {
        let mut col = db.collection("monotonic").expect("Failed to open");
        let first = col
            .insert([doc(json!({})), doc(json!({}))])
            .expect("Failed to insert");
        col.remove(first).expect("Failed to remove");

        let next = col.insert(doc(json!({}))).expect("Failed to insert");
        assert_eq!(next, vec![DocumentId::new(3)]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::TestDatabase;
    use crate::generators::{
        document_batch_strategy, operation_sequence_strategy, update_order_strategy,
        PropTestConfig,
    };
    use jotdb_core::{apply, CollectionState, Config, CoreError, Operation, Schema, SchemaError};
    use proptest::prelude::*;

    fn all_checks(db: &Database) {
        checks::check_insert_round_trip(db);
        checks::check_pagination(db);
        checks::check_idempotent_create(db);
        checks::check_remove_missing_is_noop(db);
        checks::check_shallow_merge(db);
        checks::check_monotonic_ids(db);
    }

    #[test]
    fn test_checks_in_memory() {
        all_checks(&TestDatabase::memory());
    }

    #[test]
    fn test_checks_on_file() {
        all_checks(&TestDatabase::file());
    }

    #[test]
    fn test_integration_harness() {
        let mut harness = IntegrationHarness::new();
        let ids = harness.insert(vec![doc(json!({"value": "a"})), doc(json!({"value": "b"}))]);
        assert_eq!(harness.tracked_count(), 2);

        harness.update(vec![UpdateOrder::new(ids[1], doc(json!({"value": "z"})))]);
        harness.remove(vec![ids[0]]);
        harness.verify_all();
        assert_eq!(harness.tracked_count(), 1);
    }

    #[test]
    fn test_persistence_across_reconstruction() {
        let test_db = TestDatabase::file();
        {
            let mut col = test_db.collection("col").unwrap();
            col.insert([doc(json!({"value": "a"})), doc(json!({"value": "b"}))])
                .unwrap();
            col.remove(1_u64).unwrap();
        }

        let reopened = test_db.reopen();
        let mut col = reopened.collection("col").unwrap();
        assert_eq!(
            col.query(Query::new()).unwrap().docs,
            vec![doc(json!({"id": 2, "value": "b"}))]
        );
        assert_eq!(col.insert(doc(json!({}))).unwrap(), vec![DocumentId::new(3)]);
    }

    #[test]
    fn test_strict_rejection_stores_nothing() {
        let test_db = TestDatabase::strict();
        let schema = Schema::from_template(&json!({"value": "text"})).unwrap();
        let mut col = test_db.collection_with_schema("col", schema).unwrap();

        let err = col.insert(doc(json!({"value": 9999}))).unwrap_err();
        assert!(matches!(
            err,
            CoreError::SchemaViolation(SchemaError::TypeMismatch { .. })
        ));

        let reopened = test_db.reopen();
        let stored = reopened.backend().read().unwrap();
        assert!(stored.collection("col").unwrap().is_empty());
    }

    #[test]
    fn test_pretty_output_is_still_readable() {
        let test_db = TestDatabase::file_with_config(Config::default().pretty(true));
        test_db
            .collection("col")
            .unwrap()
            .insert(doc(json!({"value": "a"})))
            .unwrap();

        let raw = std::fs::read_to_string(test_db.path().unwrap()).unwrap();
        assert!(raw.contains('\n'));
        assert_eq!(test_db.reopen().collection("col").unwrap().count().unwrap(), 1);
    }

    #[test]
    fn test_external_removal_is_collection_not_found() {
        let test_db = TestDatabase::file();
        let mut col = test_db.collection("col").unwrap();

        let mut file = test_db.backend().read().unwrap();
        file.collections.remove("col");
        test_db.backend().write(&file).unwrap();

        assert!(matches!(
            col.count().unwrap_err(),
            CoreError::CollectionNotFound { .. }
        ));
    }

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn harness_matches_model(
            batches in prop::collection::vec(document_batch_strategy(4), 1..4),
            orders in prop::collection::vec(update_order_strategy(16), 0..6),
            removals in prop::collection::vec(1u64..16, 0..6),
        ) {
            let mut harness = IntegrationHarness::new();
            for batch in batches {
                harness.insert(batch);
            }
            if !orders.is_empty() {
                harness.update(orders);
            }
            if !removals.is_empty() {
                harness.remove(removals.into_iter().map(DocumentId::new).collect());
            }
            harness.verify_all();
        }

        #[test]
        fn apply_matches_model(operations in operation_sequence_strategy(0, 24, 12)) {
            let mut state = CollectionState::new();
            let mut model: BTreeMap<DocumentId, Document> = BTreeMap::new();
            let mut next_id = 1u64;
            let mut expected_ids = Vec::new();

            for operation in operations.clone() {
                match operation {
                    Operation::Insert { mut doc } => {
                        doc.insert("id".into(), Value::from(next_id));
                        model.insert(DocumentId::new(next_id), doc);
                        expected_ids.push(DocumentId::new(next_id));
                        next_id += 1;
                    }
                    Operation::Delete { id } => {
                        model.remove(&id);
                    }
                    Operation::Merge { id, fields } => {
                        if let Some(target) = model.get_mut(&id) {
                            target.extend(fields.into_iter().filter(|(key, _)| key != "id"));
                        }
                    }
                }
            }

            let ids = apply(&mut state, operations).unwrap();
            prop_assert_eq!(ids, expected_ids);
            prop_assert_eq!(state.documents, model);
            prop_assert_eq!(state.next_id, DocumentId::new(next_id));
        }
    }
}
