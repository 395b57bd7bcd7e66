//! Collection schemas and document validation.
//!
//! A schema is a tagged model of the expected document shape:
//!
//! - [`Schema::Scalar`] - a value of a single [`ValueKind`]
//! - [`Schema::List`] - an array whose elements all match one element schema
//! - [`Schema::Object`] - a record with a closed set of keys
//!
//! Schemas are usually built from a template document whose values are
//! samples of the expected types:
//!
//! ```rust
//! use jotdb_core::Schema;
//! use serde_json::json;
//!
//! let schema = Schema::from_template(&json!({
//!     "name": "",
//!     "tags": [""],
//!     "address": { "zip": 0 },
//! }))
//! .unwrap();
//!
//! let doc = json!({ "name": "ana", "tags": ["a", "b"] });
//! assert!(schema.validate(doc.as_object().unwrap()).is_ok());
//! ```
//!
//! Validation only inspects keys present in the document; absent keys are
//! allowed. Every present key must be declared, and its value must have the
//! declared kind.

use jotdb_storage::Document;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Path reported when the document itself has the wrong shape.
const ROOT_PATH: &str = "$";

/// Runtime kind of a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `null`.
    Null,
    /// `true` or `false`.
    Boolean,
    /// Any integer or floating point number.
    Number,
    /// A string.
    String,
    /// An array.
    Array,
    /// An object.
    Object,
}

impl ValueKind {
    /// Returns the kind of a value.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Returns the lowercase name of the kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors produced while building a schema or validating a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A value has a different kind than declared.
    #[error("type mismatch at `{key}`: expected {expected}, found {actual}")]
    TypeMismatch {
        /// Path of the offending key.
        key: String,
        /// Declared kind.
        expected: ValueKind,
        /// Kind found in the document.
        actual: ValueKind,
    },

    /// An array element has a different kind than the element schema.
    #[error("type mismatch in `{key}[{index}]`: expected {expected}, found {actual}")]
    ArrayElementMismatch {
        /// Path of the array.
        key: String,
        /// Position of the offending element.
        index: usize,
        /// Declared element kind.
        expected: ValueKind,
        /// Kind found in the document.
        actual: ValueKind,
    },

    /// The document holds a key the schema does not declare.
    #[error("unknown key in document: `{key}`")]
    UnknownKey {
        /// Path of the undeclared key.
        key: String,
    },

    /// A template could not be turned into a schema.
    #[error("invalid schema template at `{key}`: {message}")]
    InvalidTemplate {
        /// Path of the offending template value.
        key: String,
        /// What is wrong with it.
        message: String,
    },
}

/// Expected shape of a document or of one of its values.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// A value of a single kind.
    Scalar(ValueKind),
    /// An array of values matching the element schema.
    List(Box<Schema>),
    /// A record with the given fields.
    Object(BTreeMap<String, Schema>),
}

impl Default for Schema {
    /// An object schema that declares no fields.
    fn default() -> Self {
        Self::Object(BTreeMap::new())
    }
}

impl Schema {
    /// String scalar.
    #[must_use]
    pub const fn string() -> Self {
        Self::Scalar(ValueKind::String)
    }

    /// Number scalar.
    #[must_use]
    pub const fn number() -> Self {
        Self::Scalar(ValueKind::Number)
    }

    /// Boolean scalar.
    #[must_use]
    pub const fn boolean() -> Self {
        Self::Scalar(ValueKind::Boolean)
    }

    /// Null scalar.
    #[must_use]
    pub const fn null() -> Self {
        Self::Scalar(ValueKind::Null)
    }

    /// Array of `element`.
    #[must_use]
    pub fn list(element: Schema) -> Self {
        Self::List(Box::new(element))
    }

    /// Object with the given fields.
    pub fn object<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Schema)>,
        K: Into<String>,
    {
        Self::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Builds a schema from a template value.
    ///
    /// Scalars stand for their own kind, an array stands for a list of its
    /// first element, and an object stands for a record of its fields.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidTemplate`] if the template contains an
    /// empty array, since its element type cannot be inferred.
    pub fn from_template(template: &Value) -> Result<Self, SchemaError> {
        Self::from_template_at(template, ROOT_PATH)
    }

    fn from_template_at(template: &Value, path: &str) -> Result<Self, SchemaError> {
        match template {
            Value::Array(items) => {
                let first = items.first().ok_or_else(|| SchemaError::InvalidTemplate {
                    key: path.to_owned(),
                    message: "empty array has no element type".into(),
                })?;
                let element = Self::from_template_at(first, &format!("{path}[0]"))?;
                Ok(Self::list(element))
            }
            Value::Object(fields) => {
                let mut schema = BTreeMap::new();
                for (key, value) in fields {
                    schema.insert(key.clone(), Self::from_template_at(value, &join(path, key))?);
                }
                Ok(Self::Object(schema))
            }
            scalar => Ok(Self::Scalar(ValueKind::of(scalar))),
        }
    }

    /// Returns the kind of value this schema accepts.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Scalar(kind) => *kind,
            Self::List(_) => ValueKind::Array,
            Self::Object(_) => ValueKind::Object,
        }
    }

    /// Returns true for an object schema without fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Object(fields) if fields.is_empty())
    }

    /// Returns the schema of a top-level field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Schema> {
        match self {
            Self::Object(fields) => fields.get(key),
            _ => None,
        }
    }

    /// Validates a document against this schema.
    ///
    /// Stops at the first violation.
    ///
    /// # Errors
    ///
    /// Returns the violation found.
    pub fn validate(&self, doc: &Document) -> Result<(), SchemaError> {
        match self {
            Self::Object(fields) => check_fields(fields, doc, ""),
            other => Err(SchemaError::TypeMismatch {
                key: ROOT_PATH.to_owned(),
                expected: other.kind(),
                actual: ValueKind::Object,
            }),
        }
    }

    fn check(&self, value: &Value, path: &str) -> Result<(), SchemaError> {
        match (self, value) {
            (Self::Object(fields), Value::Object(map)) => check_fields(fields, map, path),
            (Self::List(element), Value::Array(items)) => {
                let expected = element.kind();
                for (index, item) in items.iter().enumerate() {
                    let actual = ValueKind::of(item);
                    if actual != expected {
                        return Err(SchemaError::ArrayElementMismatch {
                            key: path.to_owned(),
                            index,
                            expected,
                            actual,
                        });
                    }
                    if !matches!(**element, Self::Scalar(_)) {
                        element.check(item, &format!("{path}[{index}]"))?;
                    }
                }
                Ok(())
            }
            (schema, value) => {
                let actual = ValueKind::of(value);
                if schema.kind() == actual {
                    Ok(())
                } else {
                    Err(SchemaError::TypeMismatch {
                        key: path.to_owned(),
                        expected: schema.kind(),
                        actual,
                    })
                }
            }
        }
    }
}

fn check_fields(
    fields: &BTreeMap<String, Schema>,
    doc: &Map<String, Value>,
    path: &str,
) -> Result<(), SchemaError> {
    for (key, value) in doc {
        let key_path = join(path, key);
        let schema = fields
            .get(key)
            .ok_or_else(|| SchemaError::UnknownKey { key: key_path.clone() })?;
        schema.check(value, &key_path)?;
    }
    Ok(())
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() || path == ROOT_PATH {
        key.to_owned()
    } else {
        format!("{path}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().expect("object")
    }

    fn schema(template: Value) -> Schema {
        Schema::from_template(&template).unwrap()
    }

    #[test]
    fn template_builds_tagged_model() {
        let built = schema(json!({"value": "", "count": 0, "tags": [""], "meta": {"ok": true}}));
        let expected = Schema::object([
            ("value", Schema::string()),
            ("count", Schema::number()),
            ("tags", Schema::list(Schema::string())),
            ("meta", Schema::object([("ok", Schema::boolean())])),
        ]);
        assert_eq!(built, expected);
    }

    #[test]
    fn empty_array_template_is_rejected() {
        let result = Schema::from_template(&json!({"tags": []}));
        assert_eq!(
            result,
            Err(SchemaError::InvalidTemplate {
                key: "tags".into(),
                message: "empty array has no element type".into(),
            })
        );
    }

    #[test]
    fn matching_document_passes() {
        let s = schema(json!({"value": ""}));
        assert!(s.validate(&doc(json!({"value": "a"}))).is_ok());
    }

    #[test]
    fn absent_keys_are_allowed() {
        let s = schema(json!({"id": 0, "value": ""}));
        assert!(s.validate(&doc(json!({"value": "a"}))).is_ok());
        assert!(s.validate(&doc(json!({}))).is_ok());
    }

    #[test]
    fn scalar_type_mismatch() {
        let s = schema(json!({"value": ""}));
        let err = s.validate(&doc(json!({"value": 9999}))).unwrap_err();
        assert_eq!(
            err,
            SchemaError::TypeMismatch {
                key: "value".into(),
                expected: ValueKind::String,
                actual: ValueKind::Number,
            }
        );
    }

    #[test]
    fn unknown_key_is_rejected() {
        let s = schema(json!({"value": ""}));
        let err = s.validate(&doc(json!({"value": "a", "another": "b"}))).unwrap_err();
        assert_eq!(err, SchemaError::UnknownKey { key: "another".into() });
    }

    #[test]
    fn nested_lists_of_objects() {
        let s = schema(json!({"value": {"extend": [{"key": [0]}], "another": ""}}));

        let good = doc(json!({
            "value": {"extend": [{"key": [1, 2]}, {"key": [3]}], "another": "hello"}
        }));
        assert!(s.validate(&good).is_ok());

        let bad = doc(json!({
            "value": {"extend": [{"key": [1, "2"]}], "another": "hello"}
        }));
        assert_eq!(
            s.validate(&bad).unwrap_err(),
            SchemaError::ArrayElementMismatch {
                key: "value.extend[0].key".into(),
                index: 1,
                expected: ValueKind::Number,
                actual: ValueKind::String,
            }
        );
    }

    #[test]
    fn unknown_key_inside_list_element() {
        let s = schema(json!({"items": [{"name": ""}]}));
        let err = s
            .validate(&doc(json!({"items": [{"name": "a"}, {"name": "b", "x": 1}]})))
            .unwrap_err();
        assert_eq!(err, SchemaError::UnknownKey { key: "items[1].x".into() });
    }

    #[test]
    fn keys_after_an_array_field_are_still_checked() {
        let s = schema(json!({"a": [0], "z": ""}));
        let err = s.validate(&doc(json!({"a": [1, 2], "z": 5}))).unwrap_err();
        assert!(matches!(err, SchemaError::TypeMismatch { ref key, .. } if key == "z"));
    }

    #[test]
    fn array_where_scalar_expected() {
        let s = schema(json!({"value": ""}));
        let err = s.validate(&doc(json!({"value": ["a"]}))).unwrap_err();
        assert_eq!(
            err,
            SchemaError::TypeMismatch {
                key: "value".into(),
                expected: ValueKind::String,
                actual: ValueKind::Array,
            }
        );
    }

    #[test]
    fn object_where_scalar_expected() {
        let s = schema(json!({"value": 0}));
        let err = s.validate(&doc(json!({"value": {"n": 1}}))).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::TypeMismatch { expected: ValueKind::Number, actual: ValueKind::Object, .. }
        ));
    }

    #[test]
    fn null_is_its_own_kind() {
        let s = schema(json!({"value": ""}));
        let err = s.validate(&doc(json!({"value": null}))).unwrap_err();
        assert!(matches!(err, SchemaError::TypeMismatch { actual: ValueKind::Null, .. }));
    }

    #[test]
    fn empty_schema_rejects_every_key() {
        let s = Schema::default();
        assert!(s.is_empty());
        assert!(s.validate(&doc(json!({}))).is_ok());
        assert!(matches!(
            s.validate(&doc(json!({"a": 1}))),
            Err(SchemaError::UnknownKey { .. })
        ));
    }

    #[test]
    fn non_object_root_schema() {
        let s = Schema::string();
        let err = s.validate(&doc(json!({"a": 1}))).unwrap_err();
        assert_eq!(
            err,
            SchemaError::TypeMismatch {
                key: "$".into(),
                expected: ValueKind::String,
                actual: ValueKind::Object,
            }
        );
    }

    #[test]
    fn error_messages_name_key_and_types() {
        let err = SchemaError::TypeMismatch {
            key: "value".into(),
            expected: ValueKind::String,
            actual: ValueKind::Number,
        };
        assert_eq!(
            err.to_string(),
            "type mismatch at `value`: expected string, found number"
        );
    }
}
