use std::path::PathBuf;

use anyhow::Context;
use blogstats_cli::cli::{serve, CliCommand, CliConfig};
use blogstats_core::tracing_setup::init_tracing;
use blogstats_core::StatsService;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "blogstats-cli")]
#[command(about = "View statistics and rankings for the blog")]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, short)]
    pretty: bool,

    /// Path to JSON config file (dataDir, articlesDir, defaultImageUrl, bindAddr)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Override the data directory from the config file
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind, e.g. 127.0.0.1:5000
        #[arg(long, short = 'b')]
        bind: Option<String>,
    },

    /// Create any missing statistics documents
    Init,

    /// Start counting views for a new article
    Register {
        /// Author name (letters and underscores)
        author: String,
        /// Article index
        index: u64,
    },

    /// Record one view of an article
    View {
        author: String,
        index: u64,
    },

    /// Record a save in the recently-saved queue
    Save {
        author: String,
        index: u64,
        /// Article title
        #[arg(long, short = 't', default_value = "")]
        title: String,
        /// Display date
        #[arg(long, short = 'd', default_value = "")]
        date: String,
        /// Short preview of the content
        #[arg(long, default_value = "")]
        preview: String,
        /// Image URL (can be specified multiple times)
        #[arg(long, short = 'i')]
        image: Vec<String>,
    },

    /// Show the hottest articles
    Hottest {
        /// Return entries ordered by views instead of the stored columns
        #[arg(long)]
        sorted: bool,
    },

    /// Show recently saved articles
    Recent,

    /// Reconcile the hottest list with the leaderboard
    Sync,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let mut config = load_config(&cli);
    if let Some(ref data_dir) = cli.data_dir {
        config.data_dir = Some(data_dir.clone());
    }

    let command = match cli.command {
        Some(Commands::Serve { bind }) => {
            let bind_addr = bind.unwrap_or_else(|| config.bind_addr());
            if let Err(e) = open_service(&config).and_then(|service| serve(bind_addr, service)) {
                eprintln!("Server error: {:#}", e);
                std::process::exit(1);
            }
            return;
        }
        Some(Commands::Init) => CliCommand::Init,
        Some(Commands::Register { author, index }) => CliCommand::Register { author, index },
        Some(Commands::View { author, index }) => CliCommand::View { author, index },
        Some(Commands::Save {
            author,
            index,
            title,
            date,
            preview,
            image,
        }) => CliCommand::Save {
            author,
            index,
            title,
            date,
            preview,
            image_urls: image,
        },
        Some(Commands::Hottest { sorted }) => CliCommand::Hottest { sorted },
        Some(Commands::Recent) => CliCommand::Recent,
        Some(Commands::Sync) => CliCommand::Sync,
        None => {
            eprintln!("No command specified. Use --help for usage.");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(&command, &config, cli.pretty) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn open_service(config: &CliConfig) -> anyhow::Result<StatsService> {
    let core_config = config.core_config();
    StatsService::open(&core_config).with_context(|| {
        format!(
            "Failed to open data directory: {}",
            core_config.data_dir.display()
        )
    })
}

fn run_command(command: &CliCommand, config: &CliConfig, pretty: bool) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let result = command.execute(&service)?;
    let output = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", output);
    Ok(())
}

/// Load configuration from the `--config` file, or defaults when none is given
fn load_config(cli: &Cli) -> CliConfig {
    let Some(ref path) = cli.config else {
        return CliConfig::default();
    };
    match CliConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
