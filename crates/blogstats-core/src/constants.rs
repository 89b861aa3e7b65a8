/// Maximum number of articles held on the hottest leaderboard.
pub const LEADERBOARD_CAPACITY: usize = 6;

/// Maximum number of articles held in the recently-saved queue.
pub const RECENCY_CAPACITY: usize = 9;

/// Image shown for a hottest article that has no images of its own.
pub const DEFAULT_IMAGE_URL: &str = "http://vagueame.top/sources/nebula.avif";

pub const COUNTER_FILE: &str = "viewTimes.json";
pub const STATISTIC_FILE: &str = "statistic.json";
pub const RECENCY_FILE: &str = "recently.json";

/// Per-author article index file, relative to `<articles_dir>/<author>/`.
pub const ARTICLE_INDEX_FILE: &str = "article.json";

/// Env var that enables an additional debug log file.
pub const LOG_FILE_ENV: &str = "BLOGSTATS_LOG_FILE";
