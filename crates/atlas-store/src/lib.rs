//! Single-table entity storage for Atlas.
//!
//! Every entity kind lives in the same logical table. Records are addressed by
//! a namespaced partition key and a composite sort key; hierarchy is encoded
//! entirely in the sort key, so "all places of a destination" or "all photos
//! of a place" is a prefix query rather than a join or secondary index.
//!
//! # Storage Backends
//!
//! All backends implement the [`TableStore`] trait:
//!
//! - [`InMemoryTable`] -- `BTreeMap`-based table for tests and embedding
//! - [`JsonFileTable`] -- whole-table JSON file, rewritten atomically
//!
//! # Design Rules
//!
//! 1. `put` is an upsert: it overwrites any record at the exact same key.
//! 2. Deleting a key that does not exist is a no-op.
//! 3. Prefix queries never cross partitions.
//! 4. A [`WriteBatch`] is applied all-or-nothing by the bundled backends.
//! 5. Every backend failure surfaces as an error; nothing is retried.

pub mod batch;
pub mod error;
pub mod file;
pub mod memory;
pub mod repository;
pub mod traits;

pub use batch::WriteBatch;
pub use error::{StoreError, StoreResult};
pub use file::JsonFileTable;
pub use memory::InMemoryTable;
pub use repository::EntityRepository;
pub use traits::TableStore;
