use serde::{Deserialize, Serialize};
use tracing::warn;

use super::column_value;
use super::ArticleKey;

/// Display record for one leaderboard article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HottestEntry {
    pub user: String,
    pub index: u64,
    pub date: String,
    pub title: String,
    /// Always empty; full text is not denormalized into the statistics file.
    pub content: String,
    pub image_url: String,
    pub views: u64,
}

impl HottestEntry {
    pub fn key(&self) -> ArticleKey {
        ArticleKey::new(&self.user, self.index)
    }
}

/// Persisted parallel-array form of the hottest projection.
///
/// Row `i` across all columns describes one article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HottestColumns {
    #[serde(default)]
    pub index: Vec<u64>,
    #[serde(default)]
    pub user: Vec<String>,
    #[serde(default)]
    pub date: Vec<String>,
    #[serde(default)]
    pub views: Vec<u64>,
    #[serde(default)]
    pub title: Vec<String>,
    #[serde(default)]
    pub content: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl HottestColumns {
    fn is_aligned(&self) -> bool {
        let rows = self.user.len();
        [
            self.index.len(),
            self.date.len(),
            self.views.len(),
            self.title.len(),
            self.content.len(),
            self.image_urls.len(),
        ]
        .iter()
        .all(|len| *len == rows)
    }
}

/// The hottest projection as records, kept in leaderboard-implied order.
///
/// Serializes to and from [`HottestColumns`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "HottestColumns", into = "HottestColumns")]
pub struct HottestProjection(pub Vec<HottestEntry>);

impl HottestProjection {
    pub fn entries(&self) -> &[HottestEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn position(&self, key: &ArticleKey) -> Option<usize> {
        self.0
            .iter()
            .position(|entry| entry.user == key.author && entry.index == key.index)
    }

    /// Entries ordered by views, highest first. Ties keep stored order.
    pub fn sorted_by_views(&self) -> Vec<HottestEntry> {
        let mut entries = self.0.clone();
        entries.sort_by(|a, b| b.views.cmp(&a.views));
        entries
    }
}

impl From<HottestColumns> for HottestProjection {
    fn from(columns: HottestColumns) -> Self {
        if !columns.is_aligned() {
            warn!(
                rows = columns.user.len(),
                "hottest columns have mismatched lengths, padding short columns"
            );
        }
        let entries = (0..columns.user.len())
            .map(|row| HottestEntry {
                user: columns.user[row].clone(),
                index: column_value(&columns.index, row),
                date: column_value(&columns.date, row),
                title: column_value(&columns.title, row),
                content: column_value(&columns.content, row),
                image_url: column_value(&columns.image_urls, row),
                views: column_value(&columns.views, row),
            })
            .collect();
        Self(entries)
    }
}

impl From<HottestProjection> for HottestColumns {
    fn from(projection: HottestProjection) -> Self {
        let mut columns = HottestColumns::default();
        for entry in projection.0 {
            columns.index.push(entry.index);
            columns.user.push(entry.user);
            columns.date.push(entry.date);
            columns.views.push(entry.views);
            columns.title.push(entry.title);
            columns.content.push(entry.content);
            columns.image_urls.push(entry.image_url);
        }
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user: &str, index: u64, views: u64) -> HottestEntry {
        HottestEntry {
            user: user.to_string(),
            index,
            date: "2024-05-01".to_string(),
            title: format!("{user} #{index}"),
            content: String::new(),
            image_url: "http://img/1.png".to_string(),
            views,
        }
    }

    #[test]
    fn test_serializes_as_parallel_arrays() {
        let projection = HottestProjection(vec![entry("amy", 1, 9), entry("bob", 4, 3)]);
        let value = serde_json::to_value(&projection).unwrap();
        assert_eq!(value["user"], serde_json::json!(["amy", "bob"]));
        assert_eq!(value["index"], serde_json::json!([1, 4]));
        assert_eq!(value["views"], serde_json::json!([9, 3]));
        assert_eq!(value["content"], serde_json::json!(["", ""]));

        let back: HottestProjection = serde_json::from_value(value).unwrap();
        assert_eq!(back, projection);
    }

    #[test]
    fn test_short_columns_are_padded() {
        let json = r#"{"user": ["amy", "bob"], "index": [1, 2], "views": [5]}"#;
        let projection: HottestProjection = serde_json::from_str(json).unwrap();
        assert_eq!(projection.len(), 2);
        assert_eq!(projection.entries()[0].views, 5);
        assert_eq!(projection.entries()[1].views, 0);
        assert_eq!(projection.entries()[1].title, "");
    }

    #[test]
    fn test_sorted_by_views_is_stable() {
        let projection = HottestProjection(vec![entry("a", 1, 2), entry("b", 2, 7), entry("c", 3, 2)]);
        let users: Vec<_> = projection
            .sorted_by_views()
            .into_iter()
            .map(|e| e.user)
            .collect();
        assert_eq!(users, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_position_matches_author_and_index() {
        let projection = HottestProjection(vec![entry("amy", 1, 9), entry("amy", 11, 3)]);
        assert_eq!(projection.position(&ArticleKey::new("amy", 11)), Some(1));
        assert_eq!(projection.position(&ArticleKey::new("am", 111)), None);
    }
}
