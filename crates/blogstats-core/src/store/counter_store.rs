use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::document::DocumentStore;
use crate::error::{StatsError, StatsResult};

/// `{ "<author><index>": <views>, ... }`, in insertion order.
pub type CounterDocument = Map<String, Value>;

/// Lifetime view counts for every article ever saved.
pub struct CounterStore {
    doc: Arc<dyn DocumentStore<CounterDocument>>,
}

fn validate(key: &str, value: &Value) -> StatsResult<u64> {
    value.as_u64().ok_or_else(|| StatsError::TypeMismatch {
        key: key.to_string(),
        found: value.to_string(),
    })
}

impl CounterStore {
    pub fn new(doc: Arc<dyn DocumentStore<CounterDocument>>) -> Self {
        Self { doc }
    }

    /// Add one view to `key` and return the new count.
    ///
    /// Counters are never created here; an unknown key is `KeyNotFound`.
    pub fn increment(&self, key: &str) -> StatsResult<u64> {
        let mut new_count = 0;
        self.doc.update(&mut |doc| {
            let value = doc
                .get_mut(key)
                .ok_or_else(|| StatsError::KeyNotFound(key.to_string()))?;
            new_count = validate(key, value)?
                .checked_add(1)
                .ok_or_else(|| StatsError::CounterOverflow(key.to_string()))?;
            *value = Value::from(new_count);
            Ok(true)
        })?;
        debug!(key, views = new_count, "view counter incremented");
        Ok(new_count)
    }

    /// Create a zero counter for a newly saved article. Existing counts are left alone.
    /// Returns true if the counter was created.
    pub fn seed(&self, key: &str) -> StatsResult<bool> {
        self.doc.update(&mut |doc| {
            if doc.contains_key(key) {
                return Ok(false);
            }
            doc.insert(key.to_string(), Value::from(0u64));
            Ok(true)
        })
    }

    pub fn get(&self, key: &str) -> StatsResult<Option<u64>> {
        let doc = self.doc.load()?;
        doc.get(key).map(|value| validate(key, value)).transpose()
    }

    /// Number of counters, including any holding invalid values.
    pub fn len(&self) -> StatsResult<usize> {
        Ok(self.doc.load()?.len())
    }

    pub fn is_empty(&self) -> StatsResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Every valid counter in document order. Invalid values are skipped.
    pub fn snapshot(&self) -> StatsResult<Vec<(String, u64)>> {
        let doc = self.doc.load()?;
        let mut counts = Vec::with_capacity(doc.len());
        for (key, value) in &doc {
            match validate(key, value) {
                Ok(count) => counts.push((key.clone(), count)),
                Err(e) => warn!("skipping counter: {}", e),
            }
        }
        Ok(counts)
    }
}
