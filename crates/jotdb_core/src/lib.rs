//! # JotDB Core
//!
//! Collection engine for JotDB.
//!
//! This crate provides:
//! - Collections of JSON documents with auto-assigned integer ids
//! - Predicate queries with pagination
//! - Schemas and a schema-validating backend
//! - The [`Backend`] trait, through which a backend can override any
//!   collection operation
//! - The [`Database`] facade
//!
//! Every operation re-reads the backend before acting, and every mutation
//! is staged as [`Operation`]s and written back through a read-apply-write
//! cycle. There is no transaction isolation: the last writer wins.
//!
//! ## Example
//!
//! ```rust
//! use jotdb_core::{Database, Query};
//! use serde_json::json;
//!
//! let db = Database::open_in_memory();
//! let mut col = db.collection("col")?;
//!
//! let doc = json!({"value": "a"}).as_object().cloned().unwrap();
//! col.insert(doc)?;
//!
//! let result = col.query(Query::new())?;
//! assert_eq!(result.docs[0]["id"], json!(1));
//! # Ok::<(), jotdb_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod collection;
mod config;
mod database;
mod error;
mod operation;
mod schema;
mod strict;

pub use backend::Backend;
pub use collection::{
    defaults, Batch, Collection, Predicate, Query, QueryResult, UpdateOrder, DEFAULT_LIMIT,
};
pub use config::Config;
pub use database::Database;
pub use error::{CoreError, CoreResult};
pub use operation::{apply, Operation};
pub use schema::{Schema, SchemaError, ValueKind};
pub use strict::StrictBackend;

pub use jotdb_storage::{
    CollectionState, Document, DocumentId, FileBackend, FileOptions, InMemoryBackend,
    StorageBackend, StoreFile,
};
