//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random test data
//! that maintains required invariants.

use jotdb_core::{Document, DocumentId, Operation, UpdateOrder};
use proptest::prelude::*;
use serde_json::Value;

/// Strategy for generating valid collection names.
pub fn collection_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_]{0,31}").expect("Invalid regex")
}

/// Strategy for generating document field names.
///
/// Never produces `id`, which the engine assigns.
pub fn field_name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{1,8}")
        .expect("Invalid regex")
        .prop_filter("Field name must not be the id field", |s| s != "id")
}

/// Strategy for generating scalar JSON values.
pub fn scalar_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        prop::string::string_regex("[ -~]{0,16}")
            .expect("Invalid regex")
            .prop_map(Value::String),
    ]
}

/// Strategy for generating JSON values nested up to a few levels.
pub fn field_value_strategy() -> impl Strategy<Value = Value> {
    scalar_value_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(field_name_strategy(), inner, 0..4)
                .prop_map(|fields| Value::Object(fields.into_iter().collect())),
        ]
    })
}

/// Strategy for generating documents without an `id` field.
pub fn document_strategy() -> impl Strategy<Value = Document> {
    prop::collection::btree_map(field_name_strategy(), field_value_strategy(), 0..6)
        .prop_map(|fields| fields.into_iter().collect())
}

/// Strategy for generating a non-empty batch of documents.
pub fn document_batch_strategy(max_len: usize) -> impl Strategy<Value = Vec<Document>> {
    prop::collection::vec(document_strategy(), 1..=max_len.max(1))
}

/// Strategy for generating ids in `1..=max_id`.
pub fn document_id_strategy(max_id: u64) -> impl Strategy<Value = DocumentId> {
    (1..=max_id.max(1)).prop_map(DocumentId::new)
}

/// Strategy for generating update orders targeting ids in `1..=max_id`.
pub fn update_order_strategy(max_id: u64) -> impl Strategy<Value = UpdateOrder> {
    (document_id_strategy(max_id), document_strategy())
        .prop_map(|(id, data)| UpdateOrder::new(id, data))
}

/// Strategy for generating staged operations targeting ids in `1..=max_id`.
pub fn operation_strategy(max_id: u64) -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => document_strategy().prop_map(|doc| Operation::Insert { doc }),
        1 => document_id_strategy(max_id).prop_map(|id| Operation::Delete { id }),
        2 => (document_id_strategy(max_id), document_strategy())
            .prop_map(|(id, fields)| Operation::Merge { id, fields }),
    ]
}

/// Strategy for generating a sequence of operations.
pub fn operation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
    max_id: u64,
) -> impl Strategy<Value = Vec<Operation>> {
    prop::collection::vec(operation_strategy(max_id), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn collection_name_is_valid(name in collection_name_strategy()) {
            let first = name.chars().next();
            prop_assert!(first.map_or(false, |c| c.is_ascii_alphabetic()));
        }

        #[test]
        fn documents_never_carry_an_id(doc in document_strategy()) {
            prop_assert!(!doc.contains_key("id"));
        }

        #[test]
        fn ids_stay_in_range(id in document_id_strategy(10)) {
            prop_assert!((1..=10).contains(&id.as_u64()));
        }

        #[test]
        fn batches_are_not_empty(docs in document_batch_strategy(5)) {
            prop_assert!(!docs.is_empty() && docs.len() <= 5);
        }
    }
}
