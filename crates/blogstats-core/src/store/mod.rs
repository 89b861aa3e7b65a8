pub mod counter_store;
pub mod document;
pub mod leaderboard;
pub mod reconciler;
pub mod recency_store;

pub use counter_store::{CounterDocument, CounterStore};
pub use document::{DocumentStore, JsonFileStore, MemoryStore};
pub use leaderboard::{Leaderboard, StatisticDocument};
pub use reconciler::{ReconcileReport, Reconciler};
pub use recency_store::{RecencyDocument, RecencyStore};
