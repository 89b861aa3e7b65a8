pub mod commands;
pub mod config;
pub mod http;

pub use commands::CliCommand;
pub use config::CliConfig;
pub use http::{router, run_server, serve};
