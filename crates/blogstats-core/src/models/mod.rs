pub mod article;
pub mod hottest;
pub mod recency;

pub use article::{ArticleKey, ArticleRecord};
pub use hottest::{HottestColumns, HottestEntry, HottestProjection};
pub use recency::{RecencyColumns, RecencyEntry, RecencyQueue, RecencyUpdate};

/// Value at row `row` of a persisted column, or the default when the column is short.
pub(crate) fn column_value<T: Clone + Default>(column: &[T], row: usize) -> T {
    column.get(row).cloned().unwrap_or_default()
}
