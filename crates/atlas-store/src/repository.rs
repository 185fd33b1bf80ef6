//! Typed access to the single table.
//!
//! [`EntityRepository`] exposes the four raw access patterns (`get_equal`,
//! `get_by_prefix`, `put`, `delete`) plus typed helpers that derive keys from
//! [`Entity`] implementations, so callers never build key strings by hand.

use std::sync::Arc;

use atlas_types::{Entity, Partition, Record, SortKey};
use serde_json::Value;
use tracing::debug;

use crate::batch::WriteBatch;
use crate::error::StoreResult;
use crate::traits::TableStore;

/// Composite-key repository over a [`TableStore`].
#[derive(Clone)]
pub struct EntityRepository {
    table: Arc<dyn TableStore>,
}

impl std::fmt::Debug for EntityRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRepository").finish_non_exhaustive()
    }
}

impl EntityRepository {
    pub fn new(table: Arc<dyn TableStore>) -> Self {
        Self { table }
    }

    // ---------------------------------------------------------------
    // Raw access patterns
    // ---------------------------------------------------------------

    /// All records in `partition`, or the single record at `sort`.
    pub fn get_equal(
        &self,
        partition: Partition,
        sort: Option<&SortKey>,
    ) -> StoreResult<Vec<Record>> {
        self.table
            .query_equal(&partition.key(), sort.map(SortKey::as_str))
    }

    /// Records in `partition` whose sort key starts with `sort_prefix`.
    pub fn get_by_prefix(
        &self,
        partition: Partition,
        sort_prefix: &str,
    ) -> StoreResult<Vec<Record>> {
        self.table.query_prefix(&partition.key(), sort_prefix)
    }

    /// Upsert `entity` at `partition/sort`.
    pub fn put(&self, partition: Partition, sort: &SortKey, entity: Value) -> StoreResult<()> {
        debug!(partition = %partition, sort = %sort, "put record");
        self.table.put(&Record::new(partition, sort, entity))
    }

    /// Remove the record at `partition/sort`. Missing keys are ignored.
    pub fn delete(&self, partition: Partition, sort: &SortKey) -> StoreResult<()> {
        debug!(partition = %partition, sort = %sort, "delete record");
        self.table.delete(&partition.key(), sort.as_str())
    }

    /// Apply a batch of puts and deletes.
    pub fn apply(&self, batch: &WriteBatch) -> StoreResult<()> {
        debug!(operations = batch.len(), "apply batch");
        self.table.apply(batch)
    }

    // ---------------------------------------------------------------
    // Typed helpers
    // ---------------------------------------------------------------

    /// Every entity of kind `E`.
    pub fn all<E: Entity>(&self) -> StoreResult<Vec<E>> {
        decode_all(self.get_equal(E::PARTITION, None)?)
    }

    /// Every entity of kind `E` scoped directly under `parent_id`.
    pub fn children<E: Entity>(&self, parent_id: &str) -> StoreResult<Vec<E>> {
        decode_all(self.get_by_prefix(E::PARTITION, &SortKey::child_prefix(parent_id))?)
    }

    /// The entity of kind `E` stored at `key`, if any.
    pub fn find<E: Entity>(&self, key: &SortKey) -> StoreResult<Option<E>> {
        let records = self.get_equal(E::PARTITION, Some(key))?;
        match records.into_iter().next() {
            Some(record) => Ok(Some(record.decode()?)),
            None => Ok(None),
        }
    }

    /// Whether a record of kind `E` exists at `key`.
    pub fn exists<E: Entity>(&self, key: &SortKey) -> StoreResult<bool> {
        Ok(!self.get_equal(E::PARTITION, Some(key))?.is_empty())
    }

    /// Write `entity` at its own key, overwriting any previous value.
    pub fn save<E: Entity>(&self, entity: &E) -> StoreResult<()> {
        let record = Record::from_entity(entity)?;
        debug!(
            partition = %record.partition_key,
            sort = %record.sort_key,
            kind = E::NAME,
            "save entity"
        );
        self.table.put(&record)
    }

    /// Remove the entity of kind `E` at `key`.
    pub fn remove<E: Entity>(&self, key: &SortKey) -> StoreResult<()> {
        self.delete(E::PARTITION, key)
    }

    /// Write `entity` and delete every key in `stale` in one batch.
    ///
    /// A stale key equal to the entity's own key is skipped, so replacing a
    /// record with itself never deletes it.
    pub fn replace<E: Entity>(&self, entity: &E, stale: &[SortKey]) -> StoreResult<()> {
        let record = Record::from_entity(entity)?;
        let partition = record.partition_key.clone();
        let own_key = record.sort_key.clone();
        let mut batch = WriteBatch::new().put(record);
        for key in stale.iter().filter(|key| key.as_str() != own_key) {
            batch = batch.delete(partition.clone(), key.as_str());
        }
        debug!(
            partition = %partition,
            sort = %own_key,
            removed = stale.len(),
            "replace entity"
        );
        self.table.apply(&batch)
    }
}

fn decode_all<E: Entity>(records: Vec<Record>) -> StoreResult<Vec<E>> {
    records
        .iter()
        .map(|record| record.decode::<E>().map_err(Into::into))
        .collect()
}
