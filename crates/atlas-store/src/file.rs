use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use atlas_types::Record;
use tracing::{debug, info};

use crate::batch::WriteBatch;
use crate::error::{StoreError, StoreResult};
use crate::memory::{apply_batch, select_equal, select_prefix, Items};
use crate::traits::TableStore;

/// Table persisted as a single JSON file.
///
/// The file holds a JSON array of records. It is loaded once at open and
/// rewritten after every mutation by writing a sibling temp file and renaming
/// it over the original, so a crash leaves either the old or the new table on
/// disk. The in-memory copy is only updated after the rewrite succeeds.
pub struct JsonFileTable {
    path: PathBuf,
    items: RwLock<Items>,
}

impl JsonFileTable {
    /// Open the table at `path`, creating an empty one if the file is absent.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut items = Items::new();

        if path.exists() {
            let data = fs::read(&path)?;
            let records: Vec<Record> =
                serde_json::from_slice(&data).map_err(|e| StoreError::CorruptTable {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            for record in records {
                items.insert(
                    (record.partition_key.clone(), record.sort_key.clone()),
                    record,
                );
            }
        }

        info!(path = %path.display(), records = items.len(), "opened table");
        Ok(Self {
            path,
            items: RwLock::new(items),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.items.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.items.read().expect("lock poisoned").is_empty()
    }

    fn persist(&self, items: &Items) -> std::io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let records: Vec<&Record> = items.values().collect();
        let data = serde_json::to_vec_pretty(&records)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        debug!(path = %self.path.display(), records = records.len(), "table persisted");
        Ok(())
    }

    /// Run `mutate` against a copy of the table, persist it, then publish it.
    fn commit(
        &self,
        operation: &'static str,
        partition: &str,
        sort: &str,
        mutate: impl FnOnce(&mut Items),
    ) -> StoreResult<()> {
        let mut items = self.items.write().expect("lock poisoned");
        let mut next = items.clone();
        mutate(&mut next);
        self.persist(&next)
            .map_err(|e| StoreError::failure(operation, partition, sort, e.to_string()))?;
        *items = next;
        Ok(())
    }
}

impl TableStore for JsonFileTable {
    fn query_equal(&self, partition: &str, sort: Option<&str>) -> StoreResult<Vec<Record>> {
        let items = self.items.read().expect("lock poisoned");
        Ok(select_equal(&items, partition, sort))
    }

    fn query_prefix(&self, partition: &str, sort_prefix: &str) -> StoreResult<Vec<Record>> {
        let items = self.items.read().expect("lock poisoned");
        Ok(select_prefix(&items, partition, sort_prefix))
    }

    fn put(&self, record: &Record) -> StoreResult<()> {
        self.commit("put", &record.partition_key, &record.sort_key, |items| {
            items.insert(
                (record.partition_key.clone(), record.sort_key.clone()),
                record.clone(),
            );
        })
    }

    fn delete(&self, partition: &str, sort: &str) -> StoreResult<()> {
        let key = (partition.to_string(), sort.to_string());
        if !self.items.read().expect("lock poisoned").contains_key(&key) {
            return Ok(());
        }
        self.commit("delete", partition, sort, |items| {
            items.remove(&key);
        })
    }

    fn apply(&self, batch: &WriteBatch) -> StoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        self.commit("batch", "*", "*", |items| apply_batch(items, batch))
    }
}

impl std::fmt::Debug for JsonFileTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileTable")
            .field("path", &self.path)
            .field("record_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(partition: &str, sort: &str, name: &str) -> Record {
        Record {
            partition_key: partition.into(),
            sort_key: sort.into(),
            entity: json!({ "name": name }),
        }
    }

    #[test]
    fn open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table = JsonFileTable::open(dir.path().join("table.json")).unwrap();
        assert!(table.is_empty());
        // Nothing is written until the first mutation.
        assert!(!table.path().exists());
    }

    #[test]
    fn writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");
        {
            let table = JsonFileTable::open(&path).unwrap();
            table.put(&record("TRAVEL#DESTINATION", "paris123", "Paris")).unwrap();
            table.put(&record("TRAVEL#PLACE", "paris123#eiffel1", "Eiffel")).unwrap();
        }

        let table = JsonFileTable::open(&path).unwrap();
        assert_eq!(table.len(), 2);
        let places = table.query_prefix("TRAVEL#PLACE", "paris123#").unwrap();
        assert_eq!(places[0].entity["name"], "Eiffel");
    }

    #[test]
    fn delete_persists_and_missing_delete_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");
        let table = JsonFileTable::open(&path).unwrap();
        table.put(&record("TRAVEL#PLACE", "d#p", "P")).unwrap();
        table.delete("TRAVEL#PLACE", "d#p").unwrap();
        table.delete("TRAVEL#PLACE", "d#p").unwrap();

        let reopened = JsonFileTable::open(&path).unwrap();
        assert!(reopened.is_empty());
    }

    #[test]
    fn apply_commits_batch_in_one_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");
        let table = JsonFileTable::open(&path).unwrap();
        table.put(&record("TRAVEL#ALBUM", "p#old", "Old")).unwrap();

        let batch = WriteBatch::new()
            .put(record("TRAVEL#ALBUM", "p#new", "New"))
            .delete("TRAVEL#ALBUM", "p#old");
        table.apply(&batch).unwrap();

        let reopened = JsonFileTable::open(&path).unwrap();
        let albums = reopened.query_prefix("TRAVEL#ALBUM", "p#").unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].sort_key, "p#new");
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");
        fs::write(&path, b"{ not json").unwrap();
        let err = JsonFileTable::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::CorruptTable { .. }));
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("table.json");
        let table = JsonFileTable::open(&path).unwrap();
        table.put(&record("HOME#PHOTO", "abc", "x")).unwrap();
        assert!(path.exists());
    }
}
