pub mod articles;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
pub mod tracing_setup;

pub use config::CoreConfig;
pub use error::{StatsError, StatsResult};
pub use service::{StatsService, ViewOutcome};
