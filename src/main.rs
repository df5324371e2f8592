use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use playstats::api::{build_router, state::AppState};
use playstats::calculate::{
    aggregate_player_stats, get_team_stats, head_to_head_stats, scoresheet_stats,
    teammate_frequency, TracingDiagnostics,
};
use playstats::config::AppConfig;
use playstats::models::{PlayerMatch, StatKey};
use playstats::storage::{self, StorageConfig};

#[derive(Parser)]
#[command(name = "playstats")]
#[command(about = "Board-game session statistics")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./playstats.toml")]
    config: PathBuf,

    /// Data directory path (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Import a JSON array of matches into the store
    Import {
        /// Path to the JSON file
        path: PathBuf,
    },

    /// Print aggregate statistics for every player
    Players,

    /// Print head-to-head records for a player
    HeadToHead {
        /// Player key, e.g. "original-1"
        #[arg(long)]
        player: StatKey,
    },

    /// Print how often a player teams up with others
    Teammates {
        #[arg(long)]
        player: StatKey,
    },

    /// Print team-game performance for a player
    Teams {
        #[arg(long)]
        player: StatKey,
    },

    /// Print scoresheet and round breakdowns for a game
    Scoresheets {
        /// Game key, e.g. "original-3"
        #[arg(long)]
        game: StatKey,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    let (plain, json) = if cli.json_logs {
        (None, Some(tracing_subscriber::fmt::layer().json()))
    } else {
        (Some(tracing_subscriber::fmt::layer()), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .init();

    tracing::debug!("Starting playstats v{}", env!("CARGO_PKG_VERSION"));

    let storage = StorageConfig::new(config.data_dir.clone());

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.validate()?;

            let addr = format!("{}:{}", config.server.host, config.server.port);
            let app = build_router(AppState::new(config));
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Dashboard API: http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Import { path } => {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            let matches: Vec<PlayerMatch> = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse matches from {:?}", path))?;

            let summary = storage::import_matches(&storage, &matches)?;
            println!("Imported:  {}", summary.added);
            println!("Skipped:   {}", summary.skipped);
        }
        Commands::Players => {
            let matches = storage::read_matches(&storage)?;
            let window = config.stats.recent_form_window;
            let stats: Vec<_> = aggregate_player_stats(&matches)
                .into_iter()
                .map(|s| s.with_recent_form_window(window))
                .collect();
            print_json(&stats)?;
        }
        Commands::HeadToHead { player } => {
            let matches = storage::read_matches_for_player(&storage, &player)?;
            print_json(&head_to_head_stats(&matches, &player, &TracingDiagnostics))?;
        }
        Commands::Teammates { player } => {
            let matches = storage::read_matches_for_player(&storage, &player)?;
            print_json(&teammate_frequency(&matches, &player, &TracingDiagnostics))?;
        }
        Commands::Teams { player } => {
            let matches = storage::read_matches_for_player(&storage, &player)?;
            print_json(&get_team_stats(&matches, &player, &TracingDiagnostics))?;
        }
        Commands::Scoresheets { game } => {
            let matches = storage::read_matches(&storage)?;
            print_json(&scoresheet_stats(&matches, &game))?;
        }
    }

    Ok(())
}
