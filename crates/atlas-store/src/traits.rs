use atlas_types::Record;

use crate::batch::WriteBatch;
use crate::error::StoreResult;

/// A single logical key-value table addressed by (partition, sort) keys.
///
/// All implementations must satisfy these invariants:
/// - `put` overwrites any record stored at the exact same key.
/// - `delete` of a missing key succeeds without changing anything.
/// - Queries only ever return records from the requested partition.
/// - Backend failures are returned as errors, never swallowed or retried.
pub trait TableStore: Send + Sync {
    /// Every record in `partition`, or only the one at `partition/sort` when
    /// `sort` is given.
    fn query_equal(&self, partition: &str, sort: Option<&str>) -> StoreResult<Vec<Record>>;

    /// Every record in `partition` whose sort key starts with `sort_prefix`.
    fn query_prefix(&self, partition: &str, sort_prefix: &str) -> StoreResult<Vec<Record>>;

    /// Insert or overwrite the record at its key.
    fn put(&self, record: &Record) -> StoreResult<()>;

    /// Remove the record at `partition/sort`, if any.
    fn delete(&self, partition: &str, sort: &str) -> StoreResult<()>;

    /// Apply a batch: all puts, then all deletes.
    ///
    /// Default implementation issues the operations one by one and stops at
    /// the first failure. Backends that can commit the whole batch at once
    /// should override this.
    fn apply(&self, batch: &WriteBatch) -> StoreResult<()> {
        for record in batch.puts() {
            self.put(record)?;
        }
        for (partition, sort) in batch.deletes() {
            self.delete(partition, sort)?;
        }
        Ok(())
    }
}
