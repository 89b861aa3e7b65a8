//! Article metadata lookups used when a key first reaches the leaderboard.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::constants::ARTICLE_INDEX_FILE;
use crate::error::StatsResult;
use crate::models::ArticleRecord;

pub trait ArticleRepository: Send + Sync {
    /// All articles by `author`, or `None` when the author has no article collection.
    fn articles_by_author(&self, author: &str) -> StatsResult<Option<Vec<ArticleRecord>>>;
}

/// Reads `<root>/<author>/article.json`.
pub struct JsonArticleRepository {
    root: PathBuf,
}

impl JsonArticleRepository {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn index_path(&self, author: &str) -> PathBuf {
        self.root.join(author).join(ARTICLE_INDEX_FILE)
    }
}

impl ArticleRepository for JsonArticleRepository {
    fn articles_by_author(&self, author: &str) -> StatsResult<Option<Vec<ArticleRecord>>> {
        let contents = match fs::read_to_string(self.index_path(author)) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }
}

#[derive(Default)]
pub struct InMemoryArticleRepository {
    articles: RwLock<HashMap<String, Vec<ArticleRecord>>>,
}

impl InMemoryArticleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, author: &str, record: ArticleRecord) {
        self.articles
            .write()
            .entry(author.to_string())
            .or_default()
            .push(record);
    }

    pub fn remove_author(&self, author: &str) {
        self.articles.write().remove(author);
    }
}

impl ArticleRepository for InMemoryArticleRepository {
    fn articles_by_author(&self, author: &str) -> StatsResult<Option<Vec<ArticleRecord>>> {
        Ok(self.articles.read().get(author).cloned())
    }
}
