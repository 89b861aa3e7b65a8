use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::StatsError;

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([A-Za-z_]+)([0-9]+)$").expect("valid key pattern"))
}

/// Identity of an article inside the statistics documents: `{author}{index}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArticleKey {
    pub author: String,
    pub index: u64,
}

impl ArticleKey {
    pub fn new(author: impl Into<String>, index: u64) -> Self {
        Self {
            author: author.into(),
            index,
        }
    }
}

impl fmt::Display for ArticleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.author, self.index)
    }
}

impl FromStr for ArticleKey {
    type Err = StatsError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let captures = key_pattern()
            .captures(key)
            .ok_or_else(|| StatsError::MalformedKey(key.to_string()))?;
        let index = captures[2]
            .parse::<u64>()
            .map_err(|_| StatsError::MalformedKey(key.to_string()))?;
        Ok(Self::new(&captures[1], index))
    }
}

/// One row of an author's `article.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub index: String,
    #[serde(default)]
    pub date: Option<String>,
    /// Title of the article; the upload path names it after the markdown file.
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl ArticleRecord {
    /// Numeric comparison so "007" and 7 refer to the same article.
    pub fn has_index(&self, index: u64) -> bool {
        self.index.trim().parse::<u64>().map_or(false, |own| own == index)
    }
}

/// Accepts `"12"` as well as `12` for index fields written by older clients.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

/// Sequence form of [`string_or_number`].
pub(crate) fn strings_or_numbers<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "string_or_number")] String);

    Ok(Vec::<Wrapped>::deserialize(deserializer)?
        .into_iter()
        .map(|Wrapped(value)| value)
        .collect())
}
