use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blogstats_core::CoreConfig;
use serde::Deserialize;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// CLI configuration that can be loaded from a JSON file
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    /// Directory holding viewTimes.json, statistic.json and recently.json
    pub data_dir: Option<PathBuf>,

    /// Root of the per-author article.json files (defaults to the data dir)
    pub articles_dir: Option<PathBuf>,

    /// Image used for hottest articles that have none
    pub default_image_url: Option<String>,

    /// Address for `serve`
    pub bind_addr: Option<String>,
}

impl CliConfig {
    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to deserialize config")
    }

    pub fn core_config(&self) -> CoreConfig {
        let data_dir = self
            .data_dir
            .clone()
            .unwrap_or_else(CoreConfig::default_data_dir);
        let mut config = CoreConfig::new(data_dir);
        if let Some(ref articles_dir) = self.articles_dir {
            config = config.with_articles_dir(articles_dir);
        }
        if let Some(ref url) = self.default_image_url {
            config = config.with_default_image_url(url.clone());
        }
        config
    }

    pub fn bind_addr(&self) -> String {
        self.bind_addr
            .clone()
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogstats_core::constants::DEFAULT_IMAGE_URL;

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "dataDir": "/srv/blog/User_file",
            "articlesDir": "/srv/blog/articles",
            "defaultImageUrl": "http://cdn/none.png",
            "bindAddr": "0.0.0.0:8080"
        }"#;
        let config = CliConfig::from_json(json).unwrap();
        let core = config.core_config();
        assert_eq!(core.data_dir, PathBuf::from("/srv/blog/User_file"));
        assert_eq!(core.articles_dir, PathBuf::from("/srv/blog/articles"));
        assert_eq!(core.default_image_url, "http://cdn/none.png");
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_parse_config_minimal() {
        let config = CliConfig::from_json("{}").unwrap();
        assert!(config.data_dir.is_none());
        assert_eq!(config.bind_addr(), DEFAULT_BIND_ADDR);
        assert_eq!(config.core_config().default_image_url, DEFAULT_IMAGE_URL);
    }

    #[test]
    fn test_articles_dir_follows_data_dir() {
        let config = CliConfig {
            data_dir: Some(PathBuf::from("/tmp/stats")),
            ..Default::default()
        };
        assert_eq!(config.core_config().articles_dir, PathBuf::from("/tmp/stats"));
    }

    #[test]
    fn test_load_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        let err = CliConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("config.json"));
    }
}
