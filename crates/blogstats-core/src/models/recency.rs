use serde::{Deserialize, Serialize};
use tracing::warn;

use super::article::{string_or_number, strings_or_numbers};
use super::column_value;
use crate::error::StatsError;

/// Summary of a recently saved article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecencyEntry {
    pub index: String,
    pub user: String,
    pub date: String,
    pub title: String,
    pub content: String,
    pub image_urls: Vec<String>,
}

/// Save-path input; `index` is optional so a missing one can be rejected explicitly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecencyUpdate {
    #[serde(default, deserialize_with = "optional_index")]
    pub index: Option<String>,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "image_urls")]
    pub image_urls: Vec<String>,
}

fn optional_index<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "string_or_number")] String);

    Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|Wrapped(index)| index))
}

impl TryFrom<RecencyUpdate> for RecencyEntry {
    type Error = StatsError;

    fn try_from(update: RecencyUpdate) -> Result<Self, Self::Error> {
        let index = match update.index {
            Some(index) if !index.trim().is_empty() => index,
            _ => {
                return Err(StatsError::InvalidEntry(
                    "recency entry must carry an 'index'".to_string(),
                ))
            }
        };
        Ok(Self {
            index,
            user: update.user,
            date: update.date,
            title: update.title,
            content: update.content,
            image_urls: update.image_urls,
        })
    }
}

/// Persisted parallel-array form of the recency queue; row 0 is the most recent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecencyColumns {
    #[serde(default, deserialize_with = "strings_or_numbers")]
    pub index: Vec<String>,
    #[serde(default)]
    pub user: Vec<String>,
    #[serde(default)]
    pub date: Vec<String>,
    #[serde(default)]
    pub title: Vec<String>,
    #[serde(default)]
    pub content: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<Vec<String>>,
}

/// Recency queue as records, most recent first. Serializes as [`RecencyColumns`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RecencyColumns", into = "RecencyColumns")]
pub struct RecencyQueue(pub Vec<RecencyEntry>);

impl RecencyQueue {
    pub fn entries(&self) -> &[RecencyEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<RecencyColumns> for RecencyQueue {
    fn from(columns: RecencyColumns) -> Self {
        let rows = columns.index.len();
        let aligned = [
            columns.user.len(),
            columns.date.len(),
            columns.title.len(),
            columns.content.len(),
            columns.image_urls.len(),
        ]
        .iter()
        .all(|len| *len == rows);
        if !aligned {
            warn!(rows, "recency columns have mismatched lengths, padding short columns");
        }

        let entries = columns
            .index
            .iter()
            .enumerate()
            .map(|(row, index)| RecencyEntry {
                index: index.clone(),
                user: column_value(&columns.user, row),
                date: column_value(&columns.date, row),
                title: column_value(&columns.title, row),
                content: column_value(&columns.content, row),
                image_urls: column_value(&columns.image_urls, row),
            })
            .collect();
        Self(entries)
    }
}

impl From<RecencyQueue> for RecencyColumns {
    fn from(queue: RecencyQueue) -> Self {
        let mut columns = RecencyColumns::default();
        for entry in queue.0 {
            columns.index.push(entry.index);
            columns.user.push(entry.user);
            columns.date.push(entry.date);
            columns.title.push(entry.title);
            columns.content.push(entry.content);
            columns.image_urls.push(entry.image_urls);
        }
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_without_index_is_invalid() {
        let update: RecencyUpdate = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        let err = RecencyEntry::try_from(update).unwrap_err();
        assert!(matches!(err, StatsError::InvalidEntry(_)));

        let blank = RecencyUpdate {
            index: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(RecencyEntry::try_from(blank).is_err());
    }

    #[test]
    fn test_update_accepts_numeric_index() {
        let update: RecencyUpdate =
            serde_json::from_str(r#"{"index": 3, "imageUrls": ["a.png"]}"#).unwrap();
        let entry = RecencyEntry::try_from(update).unwrap();
        assert_eq!(entry.index, "3");
        assert_eq!(entry.image_urls, vec!["a.png"]);
    }

    #[test]
    fn test_update_accepts_document_field_name_for_images() {
        let update: RecencyUpdate =
            serde_json::from_str(r#"{"index": "4", "user": "bob", "image_urls": ["a.png"]}"#).unwrap();
        let entry = RecencyEntry::try_from(update).unwrap();
        assert_eq!(entry.image_urls, vec!["a.png"]);
    }

    #[test]
    fn test_queue_serializes_as_parallel_arrays() {
        let queue = RecencyQueue(vec![RecencyEntry {
            index: "B2".to_string(),
            user: "bob".to_string(),
            date: "2024-01-02".to_string(),
            title: "Second".to_string(),
            content: "preview".to_string(),
            image_urls: vec!["x.png".to_string()],
        }]);
        let value = serde_json::to_value(&queue).unwrap();
        assert_eq!(value["index"], serde_json::json!(["B2"]));
        assert_eq!(value["image_urls"], serde_json::json!([["x.png"]]));

        let back: RecencyQueue = serde_json::from_value(value).unwrap();
        assert_eq!(back, queue);
    }

    #[test]
    fn test_numeric_indices_on_disk_are_read_as_text() {
        let queue: RecencyQueue =
            serde_json::from_str(r#"{"index": [7, "8"], "user": ["a", "b"]}"#).unwrap();
        assert_eq!(queue.entries()[0].index, "7");
        assert_eq!(queue.entries()[1].index, "8");
        assert!(queue.entries()[1].image_urls.is_empty());
    }
}
