use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use atlas_types::Record;

use crate::batch::WriteBatch;
use crate::error::{StoreError, StoreResult};
use crate::traits::TableStore;

/// Records keyed by `(partition, sort)`.
pub(crate) type Items = BTreeMap<(String, String), Record>;

pub(crate) fn select_equal(items: &Items, partition: &str, sort: Option<&str>) -> Vec<Record> {
    match sort {
        Some(sort) => items
            .get(&(partition.to_string(), sort.to_string()))
            .cloned()
            .into_iter()
            .collect(),
        None => select_prefix(items, partition, ""),
    }
}

pub(crate) fn select_prefix(items: &Items, partition: &str, sort_prefix: &str) -> Vec<Record> {
    // Keys sharing a prefix are contiguous in tuple order, starting at the
    // prefix itself.
    items
        .range((partition.to_string(), sort_prefix.to_string())..)
        .take_while(|((p, s), _)| p == partition && s.starts_with(sort_prefix))
        .map(|(_, record)| record.clone())
        .collect()
}

pub(crate) fn apply_batch(items: &mut Items, batch: &WriteBatch) {
    for record in batch.puts() {
        items.insert(
            (record.partition_key.clone(), record.sort_key.clone()),
            record.clone(),
        );
    }
    for (partition, sort) in batch.deletes() {
        items.remove(&(partition.clone(), sort.clone()));
    }
}

/// In-memory, `BTreeMap`-based table.
///
/// Intended for tests and embedding. Records are held behind a `RwLock` and
/// cloned on read/write. The table can be switched read-only to simulate a
/// backend that rejects writes.
pub struct InMemoryTable {
    items: RwLock<Items>,
    read_only: AtomicBool,
}

impl InMemoryTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
            read_only: AtomicBool::new(false),
        }
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.items.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.items.read().expect("lock poisoned").is_empty()
    }

    /// Every record, in key order.
    pub fn all_records(&self) -> Vec<Record> {
        self.items
            .read()
            .expect("lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// When set, every write fails with [`StoreError::Failure`].
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    fn check_writable(&self, operation: &'static str, partition: &str, sort: &str) -> StoreResult<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::failure(
                operation,
                partition,
                sort,
                "table is read-only",
            ));
        }
        Ok(())
    }
}

impl Default for InMemoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TableStore for InMemoryTable {
    fn query_equal(&self, partition: &str, sort: Option<&str>) -> StoreResult<Vec<Record>> {
        let items = self.items.read().expect("lock poisoned");
        Ok(select_equal(&items, partition, sort))
    }

    fn query_prefix(&self, partition: &str, sort_prefix: &str) -> StoreResult<Vec<Record>> {
        let items = self.items.read().expect("lock poisoned");
        Ok(select_prefix(&items, partition, sort_prefix))
    }

    fn put(&self, record: &Record) -> StoreResult<()> {
        self.check_writable("put", &record.partition_key, &record.sort_key)?;
        let mut items = self.items.write().expect("lock poisoned");
        items.insert(
            (record.partition_key.clone(), record.sort_key.clone()),
            record.clone(),
        );
        Ok(())
    }

    fn delete(&self, partition: &str, sort: &str) -> StoreResult<()> {
        self.check_writable("delete", partition, sort)?;
        let mut items = self.items.write().expect("lock poisoned");
        items.remove(&(partition.to_string(), sort.to_string()));
        Ok(())
    }

    fn apply(&self, batch: &WriteBatch) -> StoreResult<()> {
        self.check_writable("batch", "*", "*")?;
        let mut items = self.items.write().expect("lock poisoned");
        apply_batch(&mut items, batch);
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTable")
            .field("record_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn record(partition: &str, sort: &str) -> Record {
        Record {
            partition_key: partition.into(),
            sort_key: sort.into(),
            entity: json!({ "sk": sort }),
        }
    }

    // -----------------------------------------------------------------------
    // Core CRUD
    // -----------------------------------------------------------------------

    #[test]
    fn put_and_query_equal() {
        let table = InMemoryTable::new();
        table.put(&record("TRAVEL#DESTINATION", "paris123")).unwrap();

        let found = table
            .query_equal("TRAVEL#DESTINATION", Some("paris123"))
            .unwrap();
        assert_eq!(found, vec![record("TRAVEL#DESTINATION", "paris123")]);
    }

    #[test]
    fn query_equal_without_sort_returns_partition() {
        let table = InMemoryTable::new();
        table.put(&record("TRAVEL#DESTINATION", "a")).unwrap();
        table.put(&record("TRAVEL#DESTINATION", "b")).unwrap();
        table.put(&record("TRAVEL#PLACE", "a#x")).unwrap();

        let found = table.query_equal("TRAVEL#DESTINATION", None).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|r| r.partition_key == "TRAVEL#DESTINATION"));
    }

    #[test]
    fn query_equal_missing_is_empty() {
        let table = InMemoryTable::new();
        assert!(table.query_equal("TRAVEL#PLACE", Some("nope")).unwrap().is_empty());
    }

    #[test]
    fn put_overwrites_same_key() {
        let table = InMemoryTable::new();
        table.put(&record("TRAVEL#PLACE", "d#p")).unwrap();
        let mut updated = record("TRAVEL#PLACE", "d#p");
        updated.entity = json!({ "name": "renamed" });
        table.put(&updated).unwrap();

        assert_eq!(table.len(), 1);
        let found = table.query_equal("TRAVEL#PLACE", Some("d#p")).unwrap();
        assert_eq!(found[0].entity["name"], "renamed");
    }

    #[test]
    fn delete_present_and_missing() {
        let table = InMemoryTable::new();
        table.put(&record("TRAVEL#PLACE", "d#p")).unwrap();
        table.delete("TRAVEL#PLACE", "d#p").unwrap();
        assert!(table.is_empty());
        // Second delete is a no-op, not an error.
        table.delete("TRAVEL#PLACE", "d#p").unwrap();
        assert!(table.is_empty());
    }

    // -----------------------------------------------------------------------
    // Prefix queries
    // -----------------------------------------------------------------------

    #[test]
    fn prefix_query_scopes_to_parent() {
        let table = InMemoryTable::new();
        table.put(&record("TRAVEL#PHOTO", "eiffel1#a")).unwrap();
        table.put(&record("TRAVEL#PHOTO", "eiffel1#b")).unwrap();
        table.put(&record("TRAVEL#PHOTO", "eiffel10#c")).unwrap();
        table.put(&record("TRAVEL#ALBUM", "eiffel1#alb")).unwrap();

        let found = table.query_prefix("TRAVEL#PHOTO", "eiffel1#").unwrap();
        let keys: Vec<&str> = found.iter().map(|r| r.sort_key.as_str()).collect();
        assert_eq!(keys, vec!["eiffel1#a", "eiffel1#b"]);
    }

    // -----------------------------------------------------------------------
    // Failures and batches
    // -----------------------------------------------------------------------

    #[test]
    fn read_only_rejects_writes() {
        let table = InMemoryTable::new();
        table.put(&record("TRAVEL#PLACE", "d#p")).unwrap();
        table.set_read_only(true);

        let err = table.put(&record("TRAVEL#PLACE", "d#q")).unwrap_err();
        assert!(matches!(err, StoreError::Failure { operation: "put", .. }));
        let err = table.delete("TRAVEL#PLACE", "d#p").unwrap_err();
        assert!(matches!(err, StoreError::Failure { operation: "delete", .. }));
        assert_eq!(table.len(), 1);

        // Reads still work.
        assert_eq!(table.query_equal("TRAVEL#PLACE", None).unwrap().len(), 1);
    }

    #[test]
    fn apply_puts_then_deletes() {
        let table = InMemoryTable::new();
        table.put(&record("TRAVEL#ALBUM", "p#old")).unwrap();
        let batch = WriteBatch::new()
            .put(record("TRAVEL#ALBUM", "p#new"))
            .delete("TRAVEL#ALBUM", "p#old");
        table.apply(&batch).unwrap();

        let found = table.query_prefix("TRAVEL#ALBUM", "p#").unwrap();
        assert_eq!(found, vec![record("TRAVEL#ALBUM", "p#new")]);
    }

    #[test]
    fn apply_replacing_same_key_keeps_new_record() {
        let table = InMemoryTable::new();
        let batch = WriteBatch::new()
            .put(record("TRAVEL#ALBUM", "p#a"))
            .delete("TRAVEL#ALBUM", "p#b");
        table.apply(&batch).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn read_only_apply_changes_nothing() {
        let table = InMemoryTable::new();
        table.put(&record("TRAVEL#ALBUM", "p#old")).unwrap();
        table.set_read_only(true);
        let batch = WriteBatch::new()
            .put(record("TRAVEL#ALBUM", "p#new"))
            .delete("TRAVEL#ALBUM", "p#old");
        assert!(table.apply(&batch).is_err());
        assert_eq!(table.all_records(), vec![record("TRAVEL#ALBUM", "p#old")]);
    }

    proptest! {
        #[test]
        fn prefix_query_returns_exactly_matching_records(
            keys in proptest::collection::vec(("[AB]", "[a-c#]{0,5}"), 0..40),
            prefix in "[a-c#]{0,3}",
        ) {
            let table = InMemoryTable::new();
            for (partition, sort) in &keys {
                table.put(&record(partition, sort)).unwrap();
            }

            let found = table.query_prefix("A", &prefix).unwrap();
            let mut got: Vec<String> = found.iter().map(|r| r.sort_key.clone()).collect();
            got.sort();

            let mut expected: Vec<String> = keys
                .iter()
                .filter(|(p, s)| p == "A" && s.starts_with(&prefix))
                .map(|(_, s)| s.clone())
                .collect();
            expected.sort();
            expected.dedup();

            prop_assert!(found.iter().all(|r| r.partition_key == "A"));
            prop_assert_eq!(got, expected);
        }
    }
}
