//! Foundation types for Atlas.
//!
//! Every entity Atlas curates lives in a single logical table. A record is
//! addressed by a namespaced partition key (`TRAVEL#PLACE`) and a sort key
//! that encodes the entity's position in the hierarchy by concatenating
//! parent and own identifiers with `#`.
//!
//! # Key Types
//!
//! - [`Partition`]: namespace plus entity kind, e.g. `TRAVEL#PHOTO`
//! - [`SortKey`]: `#`-joined composite identifier within a partition
//! - [`ContentHash`]: 128-bit digest of processed image bytes
//! - [`Entity`]: implemented by every persisted model
//! - [`Record`]: the persisted `{ partitionKey, sortKey, entity }` item

pub mod entity;
pub mod error;
pub mod hash;
pub mod home;
pub mod key;
pub mod record;
pub mod resume;
pub mod travel;

pub use entity::Entity;
pub use error::TypeError;
pub use hash::ContentHash;
pub use home::HomePhoto;
pub use key::{EntityKind, Namespace, Partition, SortKey, KEY_SEPARATOR};
pub use record::Record;
pub use resume::{Education, Job, ResumeKind, Skill};
pub use travel::{sort_destinations, sort_places, Album, Destination, Photo, Place};

pub use rust_decimal::Decimal;
