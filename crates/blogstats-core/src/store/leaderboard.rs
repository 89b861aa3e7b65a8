//! Bounded top-K view leaderboard, maintained incrementally.
//!
//! While fewer than `capacity` articles exist every update is admitted. Once the
//! universe is large enough, a key must beat the smallest count on the board to get
//! in, and a full rescan of the counters only happens when the board is short of
//! entries.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::counter_store::CounterStore;
use super::document::DocumentStore;
use super::reconciler::{ReconcileReport, Reconciler};
use crate::error::StatsResult;
use crate::models::HottestProjection;

/// `statistic.json`: the display projection plus the leaderboard it is derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticDocument {
    #[serde(default)]
    pub hottest: HottestProjection,
    /// Leaderboard key → view count, highest first.
    #[serde(default)]
    pub sort: IndexMap<String, u64>,
}

pub struct Leaderboard {
    counters: Arc<CounterStore>,
    doc: Arc<dyn DocumentStore<StatisticDocument>>,
    reconciler: Reconciler,
    capacity: usize,
}

impl Leaderboard {
    pub fn new(
        counters: Arc<CounterStore>,
        doc: Arc<dyn DocumentStore<StatisticDocument>>,
        reconciler: Reconciler,
        capacity: usize,
    ) -> Self {
        Self {
            counters,
            doc,
            reconciler,
            capacity,
        }
    }

    /// Current leaderboard, highest count first.
    pub fn standings(&self) -> StatsResult<IndexMap<String, u64>> {
        Ok(self.doc.load()?.sort)
    }

    /// Display projection as last reconciled.
    pub fn projection(&self) -> StatsResult<HottestProjection> {
        Ok(self.doc.load()?.hottest)
    }

    /// Smallest count on the board, the bar a newcomer has to beat.
    pub fn threshold(&self) -> StatsResult<Option<u64>> {
        Ok(self.doc.load()?.sort.values().min().copied())
    }

    /// Apply a fresh count for `key`. Returns true if the leaderboard was rewritten,
    /// in which case the hottest projection has been reconciled as well.
    pub fn on_count_updated(&self, key: &str, new_count: u64) -> StatsResult<bool> {
        let total_keys = self.counters.len()?;
        let mut doc = self.doc.load()?;
        let mut board = std::mem::take(&mut doc.sort);

        let dirty = if total_keys < self.capacity {
            board.insert(key.to_string(), new_count);
            true
        } else {
            let mut rebuilt = false;
            if board.len() < self.capacity {
                board = self.top_counts()?;
                info!(
                    total_keys,
                    entries = board.len(),
                    "leaderboard incomplete, rebuilt from counters"
                );
                rebuilt = true;
            }
            self.admit(&mut board, key, new_count) || rebuilt
        };

        if !dirty {
            return Ok(false);
        }

        board.sort_by(|_, a, _, b| b.cmp(a));
        board.truncate(self.capacity);
        doc.sort = board;
        self.doc.save(&doc)?;

        self.reconciler.sync()?;
        Ok(true)
    }

    /// Re-run reconciliation without a count change.
    pub fn sync(&self) -> StatsResult<ReconcileReport> {
        self.reconciler.sync()
    }

    /// The `capacity` highest counters. Ties keep counter document order.
    fn top_counts(&self) -> StatsResult<IndexMap<String, u64>> {
        let mut counts = self.counters.snapshot()?;
        counts.sort_by(|(_, a), (_, b)| b.cmp(a));
        counts.truncate(self.capacity);
        Ok(counts.into_iter().collect())
    }

    fn admit(&self, board: &mut IndexMap<String, u64>, key: &str, new_count: u64) -> bool {
        if let Some(count) = board.get_mut(key) {
            *count = new_count;
            return true;
        }

        let Some(threshold) = board.values().min().copied() else {
            board.insert(key.to_string(), new_count);
            return true;
        };

        if new_count <= threshold {
            debug!(key, new_count, threshold, "below leaderboard threshold");
            return false;
        }

        if let Some(row) = board.values().position(|count| *count == threshold) {
            if let Some((evicted, count)) = board.shift_remove_index(row) {
                info!(key, new_count, %evicted, count, "replacing leaderboard minimum");
            }
        }
        board.insert(key.to_string(), new_count);
        true
    }
}
