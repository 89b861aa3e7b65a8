//! Entry points used by request handlers: views, saves and ranked reads.

use std::fs;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::articles::{ArticleRepository, JsonArticleRepository};
use crate::config::CoreConfig;
use crate::constants::{
    COUNTER_FILE, DEFAULT_IMAGE_URL, LEADERBOARD_CAPACITY, RECENCY_CAPACITY, RECENCY_FILE,
    STATISTIC_FILE,
};
use crate::error::StatsResult;
use crate::models::{ArticleKey, HottestEntry, HottestProjection, RecencyEntry, RecencyQueue, RecencyUpdate};
use crate::store::{
    CounterDocument, CounterStore, DocumentStore, JsonFileStore, Leaderboard, MemoryStore,
    RecencyDocument, RecencyStore, ReconcileReport, Reconciler, StatisticDocument,
};

/// Result of recording one article view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewOutcome {
    pub views: u64,
    pub leaderboard_changed: bool,
}

pub struct StatsService {
    counters: Arc<CounterStore>,
    leaderboard: Leaderboard,
    recency: RecencyStore,
}

impl StatsService {
    /// File-backed service rooted at `config.data_dir`. Missing documents are created
    /// with their empty shapes; existing ones are left untouched.
    pub fn open(config: &CoreConfig) -> StatsResult<Self> {
        fs::create_dir_all(&config.data_dir)?;

        let counters: Arc<dyn DocumentStore<CounterDocument>> =
            Arc::new(JsonFileStore::new(config.data_dir.join(COUNTER_FILE)));
        let stats: Arc<dyn DocumentStore<StatisticDocument>> =
            Arc::new(JsonFileStore::new(config.data_dir.join(STATISTIC_FILE)));
        let recency: Arc<dyn DocumentStore<RecencyDocument>> =
            Arc::new(JsonFileStore::new(config.data_dir.join(RECENCY_FILE)));

        let mut created = Vec::new();
        if counters.create_if_missing(&CounterDocument::default())? {
            created.push(COUNTER_FILE);
        }
        if stats.create_if_missing(&StatisticDocument::default())? {
            created.push(STATISTIC_FILE);
        }
        if recency.create_if_missing(&RecencyDocument::default())? {
            created.push(RECENCY_FILE);
        }
        if !created.is_empty() {
            info!(data_dir = %config.data_dir.display(), ?created, "initialized statistics documents");
        }

        let articles = Arc::new(JsonArticleRepository::new(&config.articles_dir));
        Ok(Self::from_parts(
            counters,
            stats,
            recency,
            articles,
            &config.default_image_url,
        ))
    }

    /// Service over in-process documents.
    pub fn in_memory(articles: Arc<dyn ArticleRepository>) -> Self {
        Self::from_parts(
            Arc::new(MemoryStore::<CounterDocument>::new()),
            Arc::new(MemoryStore::<StatisticDocument>::new()),
            Arc::new(MemoryStore::<RecencyDocument>::new()),
            articles,
            DEFAULT_IMAGE_URL,
        )
    }

    pub fn from_parts(
        counters: Arc<dyn DocumentStore<CounterDocument>>,
        stats: Arc<dyn DocumentStore<StatisticDocument>>,
        recency: Arc<dyn DocumentStore<RecencyDocument>>,
        articles: Arc<dyn ArticleRepository>,
        default_image_url: &str,
    ) -> Self {
        let counters = Arc::new(CounterStore::new(counters));
        let reconciler = Reconciler::new(stats.clone(), articles, default_image_url);
        let leaderboard = Leaderboard::new(counters.clone(), stats, reconciler, LEADERBOARD_CAPACITY);
        Self {
            counters,
            leaderboard,
            recency: RecencyStore::new(recency, RECENCY_CAPACITY),
        }
    }

    /// Start counting views for a newly created article. Returns false if it was
    /// already registered.
    pub fn register_article(&self, author: &str, index: u64) -> StatsResult<bool> {
        let key = ArticleKey::new(author, index).to_string();
        key.parse::<ArticleKey>()?;
        self.counters.seed(&key)
    }

    pub fn record_view(&self, author: &str, index: u64) -> StatsResult<ViewOutcome> {
        let key = ArticleKey::new(author, index).to_string();
        let views = self.counters.increment(&key)?;
        let leaderboard_changed = self.leaderboard.on_count_updated(&key, views)?;
        Ok(ViewOutcome {
            views,
            leaderboard_changed,
        })
    }

    pub fn record_save(
        &self,
        author: &str,
        index: u64,
        title: &str,
        date: &str,
        preview: &str,
        image_urls: Vec<String>,
    ) -> StatsResult<()> {
        self.recency.upsert(RecencyEntry {
            index: index.to_string(),
            user: author.to_string(),
            date: date.to_string(),
            title: title.to_string(),
            content: preview.to_string(),
            image_urls,
        })
    }

    /// Save-path upsert from loosely typed input; a missing index is `InvalidEntry`.
    pub fn save_recent(&self, update: RecencyUpdate) -> StatsResult<()> {
        self.recency.upsert(RecencyEntry::try_from(update)?)
    }

    pub fn view_count(&self, author: &str, index: u64) -> StatsResult<Option<u64>> {
        self.counters.get(&ArticleKey::new(author, index).to_string())
    }

    /// Hottest projection in stored order.
    pub fn leaderboard(&self) -> StatsResult<HottestProjection> {
        self.leaderboard.projection()
    }

    /// Hottest projection ordered for display, most viewed first.
    pub fn leaderboard_by_views(&self) -> StatsResult<Vec<HottestEntry>> {
        Ok(self.leaderboard()?.sorted_by_views())
    }

    pub fn standings(&self) -> StatsResult<Vec<(String, u64)>> {
        Ok(self.leaderboard.standings()?.into_iter().collect())
    }

    pub fn recents(&self) -> StatsResult<RecencyQueue> {
        self.recency.entries()
    }

    /// Reconcile the hottest projection without a count change, e.g. after article
    /// metadata that was missing has been written.
    pub fn sync_leaderboard(&self) -> StatsResult<ReconcileReport> {
        self.leaderboard.sync()
    }
}
