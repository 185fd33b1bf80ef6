use atlas_types::Record;

/// A group of puts and deletes applied together.
///
/// Puts are applied before deletes. The bundled backends apply a batch
/// atomically; a backend relying on the default [`TableStore::apply`]
/// applies it item by item.
///
/// [`TableStore::apply`]: crate::TableStore::apply
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteBatch {
    puts: Vec<Record>,
    deletes: Vec<(String, String)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(mut self, record: Record) -> Self {
        self.puts.push(record);
        self
    }

    pub fn delete(mut self, partition: impl Into<String>, sort: impl Into<String>) -> Self {
        self.deletes.push((partition.into(), sort.into()));
        self
    }

    pub fn puts(&self) -> &[Record] {
        &self.puts
    }

    pub fn deletes(&self) -> &[(String, String)] {
        &self.deletes
    }

    pub fn len(&self) -> usize {
        self.puts.len() + self.deletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puts.is_empty() && self.deletes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_collects_operations() {
        let record = Record {
            partition_key: "TRAVEL#ALBUM".into(),
            sort_key: "p#a2".into(),
            entity: json!({}),
        };
        let batch = WriteBatch::new()
            .put(record.clone())
            .delete("TRAVEL#ALBUM", "p#a1");
        assert_eq!(batch.len(), 2);
        assert!(!batch.is_empty());
        assert_eq!(batch.puts(), &[record]);
        assert_eq!(batch.deletes(), &[("TRAVEL#ALBUM".to_string(), "p#a1".to_string())]);
    }

    #[test]
    fn empty_batch() {
        assert!(WriteBatch::new().is_empty());
    }
}
