use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::Entity;
use crate::error::TypeError;
use crate::key::{Partition, SortKey};

/// One persisted item: `{ partitionKey, sortKey, entity }`.
///
/// The entity is kept as an untyped field map so the table layer never needs
/// to know which model it is storing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub partition_key: String,
    pub sort_key: String,
    pub entity: Value,
}

impl Record {
    pub fn new(partition: Partition, sort: &SortKey, entity: Value) -> Self {
        Self {
            partition_key: partition.key(),
            sort_key: sort.as_str().to_string(),
            entity,
        }
    }

    /// Serialize a model at its own key.
    ///
    /// Every key field must be a valid key segment, otherwise the record
    /// would land under another parent's prefix.
    pub fn from_entity<E: Entity>(entity: &E) -> Result<Self, TypeError> {
        let value =
            serde_json::to_value(entity).map_err(|e| TypeError::Serialization(e.to_string()))?;
        for field in E::KEY_FIELDS {
            if let Some(id) = value.get(*field).and_then(Value::as_str) {
                SortKey::validate_segment(id)?;
            }
        }
        Ok(Self::new(E::PARTITION, &entity.sort_key(), value))
    }

    /// Decode the entity field map as `E`.
    pub fn decode<E: Entity>(&self) -> Result<E, TypeError> {
        serde_json::from_value(self.entity.clone()).map_err(|e| TypeError::Decode {
            partition: self.partition_key.clone(),
            sort: self.sort_key.clone(),
            expected: E::NAME,
            reason: e.to_string(),
        })
    }

    /// Read a string field of the entity map without decoding the whole model.
    pub fn field_str(&self, field: &str) -> Option<&str> {
        self.entity.get(field).and_then(Value::as_str)
    }
}
