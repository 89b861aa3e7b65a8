use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::document::DocumentStore;
use super::leaderboard::StatisticDocument;
use crate::articles::ArticleRepository;
use crate::error::StatsError;
use crate::models::{ArticleKey, HottestEntry};

const UNKNOWN_DATE: &str = "Unknown date";
const UNTITLED: &str = "Untitled";

/// Outcome of one reconciliation pass.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub added: Vec<ArticleKey>,
    pub updated: Vec<ArticleKey>,
    pub removed: Vec<ArticleKey>,
    /// Records left for the next pass: `MalformedKey` or `MetadataMissing`.
    pub skipped: Vec<StatsError>,
}

impl ReconcileReport {
    pub fn changed(&self) -> bool {
        !(self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty())
    }
}

/// Keeps the hottest projection in step with the leaderboard's key→count mapping.
pub struct Reconciler {
    doc: Arc<dyn DocumentStore<StatisticDocument>>,
    articles: Arc<dyn ArticleRepository>,
    default_image_url: String,
}

impl Reconciler {
    pub fn new(
        doc: Arc<dyn DocumentStore<StatisticDocument>>,
        articles: Arc<dyn ArticleRepository>,
        default_image_url: impl Into<String>,
    ) -> Self {
        Self {
            doc,
            articles,
            default_image_url: default_image_url.into(),
        }
    }

    /// Reconcile the persisted document. It is written only when the projection changed.
    pub fn sync(&self) -> Result<ReconcileReport, StatsError> {
        let mut report = ReconcileReport::default();
        self.doc.update(&mut |doc| {
            report = self.reconcile(doc);
            Ok(report.changed())
        })?;

        if report.changed() {
            info!(
                added = report.added.len(),
                updated = report.updated.len(),
                removed = report.removed.len(),
                "hottest projection updated"
            );
        } else {
            debug!("hottest projection already up to date");
        }
        Ok(report)
    }

    pub fn reconcile(&self, doc: &mut StatisticDocument) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        let mut ranked: Vec<(ArticleKey, u64)> = Vec::with_capacity(doc.sort.len());
        for (raw_key, &views) in &doc.sort {
            match raw_key.parse::<ArticleKey>() {
                Ok(key) if ranked.iter().any(|(seen, _)| *seen == key) => {
                    warn!(%raw_key, %key, "leaderboard key names an article already ranked, skipped");
                }
                Ok(key) => ranked.push((key, views)),
                Err(e) => {
                    warn!("{}, skipped", e);
                    report.skipped.push(e);
                }
            }
        }

        let wanted: HashSet<&ArticleKey> = ranked.iter().map(|(key, _)| key).collect();
        doc.hottest.0.retain(|entry| {
            let key = entry.key();
            let keep = wanted.contains(&key);
            if !keep {
                report.removed.push(key);
            }
            keep
        });

        for (key, views) in &ranked {
            match doc.hottest.position(key) {
                Some(row) => {
                    let entry = &mut doc.hottest.0[row];
                    if entry.views != *views {
                        debug!(%key, from = entry.views, to = views, "refreshing hottest views");
                        entry.views = *views;
                        report.updated.push(key.clone());
                    }
                }
                None => match self.describe(key, *views) {
                    Ok(entry) => {
                        info!(%key, views, "article entered the hottest list");
                        doc.hottest.0.push(entry);
                        report.added.push(key.clone());
                    }
                    Err(e) => {
                        warn!("{}, will retry on next sync", e);
                        report.skipped.push(e);
                    }
                },
            }
        }

        report
    }

    fn describe(&self, key: &ArticleKey, views: u64) -> Result<HottestEntry, StatsError> {
        let missing = |reason: String| StatsError::MetadataMissing {
            author: key.author.clone(),
            index: key.index,
            reason,
        };

        let articles = self
            .articles
            .articles_by_author(&key.author)
            .map_err(|e| missing(e.to_string()))?
            .ok_or_else(|| missing("author has no article collection".to_string()))?;
        let record = articles
            .into_iter()
            .find(|record| record.has_index(key.index))
            .ok_or_else(|| missing("index not found in author's articles".to_string()))?;

        Ok(HottestEntry {
            user: key.author.clone(),
            index: key.index,
            date: record.date.unwrap_or_else(|| UNKNOWN_DATE.to_string()),
            title: record.filename.unwrap_or_else(|| UNTITLED.to_string()),
            content: String::new(),
            image_url: record
                .image_urls
                .into_iter()
                .next()
                .unwrap_or_else(|| self.default_image_url.clone()),
            views,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::articles::InMemoryArticleRepository;
    use crate::models::{ArticleRecord, HottestProjection};
    use crate::store::document::MemoryStore;
    use indexmap::IndexMap;

    const PLACEHOLDER: &str = "http://img/placeholder.png";

    fn record(index: &str, title: &str, images: &[&str]) -> ArticleRecord {
        ArticleRecord {
            index: index.to_string(),
            date: Some("2024-06-01".to_string()),
            filename: Some(title.to_string()),
            image_urls: images.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn setup(sort: &[(&str, u64)]) -> (Reconciler, Arc<MemoryStore<StatisticDocument>>, Arc<InMemoryArticleRepository>) {
        let doc = StatisticDocument {
            hottest: HottestProjection::default(),
            sort: sort
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<IndexMap<_, _>>(),
        };
        let store = Arc::new(MemoryStore::with_document(doc));
        let articles = Arc::new(InMemoryArticleRepository::new());
        let reconciler = Reconciler::new(store.clone(), articles.clone(), PLACEHOLDER);
        (reconciler, store, articles)
    }

    #[test]
    fn test_new_keys_are_described_from_repository() {
        let (reconciler, store, articles) = setup(&[("amy1", 5), ("amy2", 3)]);
        articles.insert("amy", record("1", "First", &["one.png", "two.png"]));
        articles.insert("amy", record("2", "Second", &[]));

        let report = reconciler.sync().unwrap();
        assert_eq!(report.added.len(), 2);

        let doc = store.load().unwrap();
        let first = &doc.hottest.entries()[0];
        assert_eq!(first.title, "First");
        assert_eq!(first.image_url, "one.png");
        assert_eq!(first.views, 5);
        assert_eq!(first.content, "");
        assert_eq!(doc.hottest.entries()[1].image_url, PLACEHOLDER);
    }

    #[test]
    fn test_second_sync_is_noop() {
        let (reconciler, store, articles) = setup(&[("amy1", 5)]);
        articles.insert("amy", record("1", "First", &[]));

        assert!(reconciler.sync().unwrap().changed());
        let before = store.load().unwrap();

        let report = reconciler.sync().unwrap();
        assert!(!report.changed());
        assert_eq!(store.load().unwrap(), before);
    }

    #[test]
    fn test_existing_entry_only_views_change() {
        let (reconciler, store, articles) = setup(&[("amy1", 5)]);
        articles.insert("amy", record("1", "First", &[]));
        reconciler.sync().unwrap();

        let mut doc = store.load().unwrap();
        doc.sort.insert("amy1".to_string(), 8);
        doc.hottest.0[0].title = "Edited elsewhere".to_string();
        store.save(&doc).unwrap();

        let report = reconciler.sync().unwrap();
        assert_eq!(report.updated, vec![ArticleKey::new("amy", 1)]);
        let entry = store.load().unwrap().hottest.entries()[0].clone();
        assert_eq!(entry.views, 8);
        assert_eq!(entry.title, "Edited elsewhere");
    }

    #[test]
    fn test_malformed_and_missing_are_skipped() {
        let (reconciler, store, articles) =
            setup(&[("not-a-key", 9), ("ghost1", 7), ("amy4", 6), ("amy1", 5)]);
        articles.insert("amy", record("1", "First", &[]));

        let report = reconciler.sync().unwrap();
        assert_eq!(report.added, vec![ArticleKey::new("amy", 1)]);
        assert_eq!(report.skipped.len(), 3);
        assert!(matches!(report.skipped[0], StatsError::MalformedKey(_)));
        assert!(matches!(
            report.skipped[1],
            StatsError::MetadataMissing { ref author, index: 1, .. } if author == "ghost"
        ));
        assert!(matches!(
            report.skipped[2],
            StatsError::MetadataMissing { index: 4, .. }
        ));
        assert_eq!(store.load().unwrap().hottest.len(), 1);
    }

    #[test]
    fn test_missing_metadata_retried_on_next_sync() {
        let (reconciler, store, articles) = setup(&[("amy3", 2)]);
        assert!(!reconciler.sync().unwrap().changed());
        assert!(store.load().unwrap().hottest.is_empty());

        articles.insert("amy", record("3", "Late", &[]));
        let report = reconciler.sync().unwrap();
        assert_eq!(report.added, vec![ArticleKey::new("amy", 3)]);
    }

    #[test]
    fn test_evicted_keys_leave_projection() {
        let (reconciler, store, articles) = setup(&[("amy1", 5), ("amy2", 4)]);
        articles.insert("amy", record("1", "First", &[]));
        articles.insert("amy", record("2", "Second", &[]));
        reconciler.sync().unwrap();

        let mut doc = store.load().unwrap();
        doc.sort.shift_remove("amy2");
        store.save(&doc).unwrap();

        let report = reconciler.sync().unwrap();
        assert_eq!(report.removed, vec![ArticleKey::new("amy", 2)]);
        let hottest = store.load().unwrap().hottest;
        assert_eq!(hottest.len(), 1);
        assert_eq!(hottest.entries()[0].index, 1);
    }

    #[test]
    fn test_aliased_keys_keep_first_ranking() {
        let (reconciler, store, articles) = setup(&[("amy1", 5), ("amy01", 3)]);
        articles.insert("amy", record("1", "First", &[]));

        let report = reconciler.sync().unwrap();
        assert_eq!(report.added, vec![ArticleKey::new("amy", 1)]);
        assert!(report.updated.is_empty());

        let hottest = store.load().unwrap().hottest;
        assert_eq!(hottest.len(), 1);
        assert_eq!(hottest.entries()[0].views, 5);
        assert!(!reconciler.sync().unwrap().changed());
    }

    #[test]
    fn test_zero_padded_key_matches_existing_entry() {
        let (reconciler, _store, articles) = setup(&[("amy01", 5)]);
        articles.insert("amy", record("1", "First", &[]));
        assert_eq!(reconciler.sync().unwrap().added.len(), 1);
        assert!(!reconciler.sync().unwrap().changed());
    }
}
