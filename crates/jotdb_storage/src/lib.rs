//! # JotDB Storage
//!
//! Storage backend trait and implementations for JotDB.
//!
//! This crate provides the lowest-level storage abstraction for JotDB: the
//! persisted data model and the backends that hold it. Backends exchange the
//! whole store on every call; they do not interpret collections or run
//! queries.
//!
//! ## Design Principles
//!
//! - Backends are whole-store read/write cells
//! - No knowledge of collection operations or schemas
//! - Must be `Send + Sync` for shared access
//! - The collection engine owns all interpretation of the store
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//! - [`FileBackend`] - For persistent storage in a JSON file
//!
//! ## Example
//!
//! ```rust
//! use jotdb_storage::{CollectionState, InMemoryBackend, StorageBackend};
//!
//! let backend = InMemoryBackend::new();
//! let mut file = backend.read().unwrap();
//! file.collections.insert("users".into(), CollectionState::new());
//! backend.write(&file).unwrap();
//! assert!(backend.read().unwrap().contains("users"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;
mod model;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::{FileBackend, FileOptions};
pub use memory::InMemoryBackend;
pub use model::{CollectionState, Document, DocumentId, StoreFile, ID_FIELD};
