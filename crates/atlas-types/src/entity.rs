use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::key::{Partition, SortKey};

/// A model persisted in the single table.
///
/// Implementors are immutable value records: an edit builds a new value and
/// writes it at the same key, replacing the old record.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Partition every record of this type lives in.
    const PARTITION: Partition;

    /// Human-readable type name, used in error messages.
    const NAME: &'static str;

    /// Serialized field names that make up the sort key. Edit workflows never
    /// change these, so an edited record always lands on its original key.
    const KEY_FIELDS: &'static [&'static str];

    /// Composite sort key derived from the record's identifiers.
    fn sort_key(&self) -> SortKey;

    /// Short label for selection lists.
    fn label(&self) -> String;
}
