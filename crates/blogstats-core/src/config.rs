use std::path::{Path, PathBuf};

use crate::constants::DEFAULT_IMAGE_URL;

#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Directory holding the counter, statistic and recency documents.
    pub data_dir: PathBuf,
    /// Root of the per-author `article.json` files.
    pub articles_dir: PathBuf,
    pub default_image_url: String,
}

impl CoreConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        Self {
            articles_dir: data_dir.clone(),
            data_dir,
            default_image_url: DEFAULT_IMAGE_URL.to_string(),
        }
    }

    pub fn with_articles_dir<P: AsRef<Path>>(mut self, articles_dir: P) -> Self {
        self.articles_dir = articles_dir.as_ref().to_path_buf();
        self
    }

    pub fn with_default_image_url(mut self, url: impl Into<String>) -> Self {
        self.default_image_url = url.into();
        self
    }

    /// `<platform data dir>/blogstats`, or `./blogstats_data` when the platform has none.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join("blogstats"))
            .unwrap_or_else(|| PathBuf::from("blogstats_data"))
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new(Self::default_data_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_articles_dir_defaults_to_data_dir() {
        let config = CoreConfig::new("/srv/blog");
        assert_eq!(config.articles_dir, PathBuf::from("/srv/blog"));
        assert_eq!(config.default_image_url, DEFAULT_IMAGE_URL);
    }

    #[test]
    fn test_builder_overrides() {
        let config = CoreConfig::new("/srv/blog")
            .with_articles_dir("/srv/users")
            .with_default_image_url("http://example.com/x.png");
        assert_eq!(config.data_dir, PathBuf::from("/srv/blog"));
        assert_eq!(config.articles_dir, PathBuf::from("/srv/users"));
        assert_eq!(config.default_image_url, "http://example.com/x.png");
    }
}
