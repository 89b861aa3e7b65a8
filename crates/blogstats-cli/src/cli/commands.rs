use anyhow::Result;
use blogstats_core::models::{HottestColumns, RecencyColumns};
use blogstats_core::store::ReconcileReport;
use blogstats_core::StatsService;
use serde_json::{json, Value};

/// One-shot command run directly against the data directory.
#[derive(Debug, Clone)]
pub enum CliCommand {
    /// Create any missing statistics documents
    Init,
    /// Seed a zero view counter for a new article
    Register { author: String, index: u64 },
    /// Record one view
    View { author: String, index: u64 },
    /// Record a save in the recency queue
    Save {
        author: String,
        index: u64,
        title: String,
        date: String,
        preview: String,
        image_urls: Vec<String>,
    },
    /// Hottest projection, optionally ordered by views
    Hottest { sorted: bool },
    /// Recently saved articles
    Recent,
    /// Reconcile the hottest projection with the leaderboard
    Sync,
}

impl CliCommand {
    pub fn execute(&self, service: &StatsService) -> Result<Value> {
        let result = match self {
            CliCommand::Init => json!({ "status": "ready" }),
            CliCommand::Register { author, index } => {
                let created = service.register_article(author, *index)?;
                json!({ "key": format!("{author}{index}"), "created": created })
            }
            CliCommand::View { author, index } => serde_json::to_value(service.record_view(author, *index)?)?,
            CliCommand::Save {
                author,
                index,
                title,
                date,
                preview,
                image_urls,
            } => {
                service.record_save(author, *index, title, date, preview, image_urls.clone())?;
                json!({ "status": "success" })
            }
            CliCommand::Hottest { sorted: true } => serde_json::to_value(service.leaderboard_by_views()?)?,
            CliCommand::Hottest { sorted: false } => {
                serde_json::to_value(HottestColumns::from(service.leaderboard()?))?
            }
            CliCommand::Recent => serde_json::to_value(RecencyColumns::from(service.recents()?))?,
            CliCommand::Sync => report_json(&service.sync_leaderboard()?),
        };
        Ok(result)
    }
}

pub fn report_json(report: &ReconcileReport) -> Value {
    let keys = |keys: &[blogstats_core::models::ArticleKey]| -> Vec<String> {
        keys.iter().map(|key| key.to_string()).collect()
    };
    json!({
        "added": keys(&report.added),
        "updated": keys(&report.updated),
        "removed": keys(&report.removed),
        "skipped": report.skipped.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
    })
}
