//! Document collections.
//!
//! A [`Collection`] is a handle onto one named table of JSON documents held
//! by a [`Backend`](crate::Backend). Operations are dispatched through the
//! backend, which runs the implementations in [`defaults`] unless it
//! overrides them.

mod batch;
pub mod defaults;
mod handle;
mod query;

pub use batch::{Batch, UpdateOrder};
pub use handle::Collection;
pub use query::{Predicate, Query, QueryResult, DEFAULT_LIMIT};
