use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::document::DocumentStore;
use crate::error::StatsResult;
use crate::models::{RecencyEntry, RecencyQueue};

/// `recently.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecencyDocument {
    #[serde(default)]
    pub recently: RecencyQueue,
}

/// Most-recently-saved articles, newest first, keyed by `index`.
///
/// `index` is unique within the queue only; two authors that reuse the same raw
/// index share a slot.
pub struct RecencyStore {
    doc: Arc<dyn DocumentStore<RecencyDocument>>,
    capacity: usize,
}

impl RecencyStore {
    pub fn new(doc: Arc<dyn DocumentStore<RecencyDocument>>, capacity: usize) -> Self {
        Self { doc, capacity }
    }

    /// Move `entry` to the front, replacing any entry with the same index, and drop
    /// the oldest entries beyond capacity.
    pub fn upsert(&self, entry: RecencyEntry) -> StatsResult<()> {
        let mut pending = Some(entry);
        self.doc.update(&mut |doc| {
            let Some(entry) = pending.take() else {
                return Ok(false);
            };
            let queue = &mut doc.recently.0;

            if let Some(pos) = queue.iter().position(|e| e.index == entry.index) {
                debug!(index = %entry.index, pos, "moving recent entry to front");
                queue.remove(pos);
            } else {
                debug!(index = %entry.index, "new recent entry");
            }
            queue.insert(0, entry);

            if queue.len() > self.capacity {
                debug!(dropped = queue.len() - self.capacity, "recency queue full, dropping oldest");
                queue.truncate(self.capacity);
            }
            Ok(true)
        })?;
        Ok(())
    }

    pub fn entries(&self) -> StatsResult<RecencyQueue> {
        Ok(self.doc.load()?.recently)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::RECENCY_CAPACITY;
    use crate::store::document::{JsonFileStore, MemoryStore};
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn entry(index: &str, title: &str) -> RecencyEntry {
        RecencyEntry {
            index: index.to_string(),
            user: "bob".to_string(),
            date: "2024-02-02".to_string(),
            title: title.to_string(),
            content: format!("{title} preview"),
            image_urls: vec![],
        }
    }

    fn indices(store: &RecencyStore) -> Vec<String> {
        store
            .entries()
            .unwrap()
            .0
            .into_iter()
            .map(|e| e.index)
            .collect()
    }

    fn memory_store() -> RecencyStore {
        RecencyStore::new(Arc::new(MemoryStore::new()), RECENCY_CAPACITY)
    }

    #[test]
    fn test_existing_entry_moves_to_front_with_new_fields() {
        let store = memory_store();
        store.upsert(entry("B1", "first")).unwrap();
        store.upsert(entry("B2", "second")).unwrap();
        assert_eq!(indices(&store), vec!["B2", "B1"]);

        store.upsert(entry("B1", "first, edited")).unwrap();
        let queue = store.entries().unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.entries()[0].index, "B1");
        assert_eq!(queue.entries()[0].title, "first, edited");
        assert_eq!(queue.entries()[1].index, "B2");
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let store = memory_store();
        for i in 0..12 {
            store.upsert(entry(&i.to_string(), "t")).unwrap();
        }
        let expected: Vec<String> = (3..12).rev().map(|i| i.to_string()).collect();
        assert_eq!(indices(&store), expected);
    }

    #[test]
    fn test_queue_invariants_hold_after_every_upsert() {
        let store = memory_store();
        let sequence = [1, 2, 3, 1, 4, 5, 6, 7, 8, 9, 10, 2, 2, 11, 5, 12, 1];
        for i in sequence {
            let index = i.to_string();
            store.upsert(entry(&index, "t")).unwrap();

            let current = indices(&store);
            assert!(current.len() <= RECENCY_CAPACITY);
            assert_eq!(current[0], index);
            let unique: HashSet<_> = current.iter().collect();
            assert_eq!(unique.len(), current.len());
        }
    }

    #[test]
    fn test_persisted_shape_is_parallel_arrays() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("recently.json");
        let store = RecencyStore::new(Arc::new(JsonFileStore::new(&path)), RECENCY_CAPACITY);
        store.upsert(entry("B1", "one")).unwrap();
        store.upsert(entry("B2", "two")).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let recently = &raw["recently"];
        assert_eq!(recently["index"], serde_json::json!(["B2", "B1"]));
        assert_eq!(recently["title"], serde_json::json!(["two", "one"]));
        assert_eq!(recently["image_urls"], serde_json::json!([[], []]));
        for column in ["user", "date", "content"] {
            assert_eq!(recently[column].as_array().unwrap().len(), 2, "{column}");
        }
    }
}
