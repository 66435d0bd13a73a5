use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use maelstrom::config::Config;
use maelstrom::leveling::Algorithm;

mod cli;

#[derive(Parser)]
#[command(name = "maelstrom")]
#[command(about = "Maelstrom - XP leveling for chat communities")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.maelstrom/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default ~/.maelstrom/config.toml
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Validate a community config (JSON) and store it
    Configure {
        community: u64,
        file: PathBuf,
    },

    /// Run recorded messages (one JSON object per line) through the pipeline
    Replay {
        events: PathBuf,

        /// Use a throwaway in-memory store instead of the database
        #[arg(long)]
        in_memory: bool,
    },

    /// Show a participant's level and rank
    Rank {
        community: u64,
        participant: u64,
    },

    /// Show the top participants of a community
    Leaderboard {
        community: u64,

        /// Rows to show (defaults to settings.leaderboard_size)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Evaluate a leveling algorithm for an XP total
    Level {
        #[arg(long)]
        xp: u64,

        #[arg(long, default_value_t = 300)]
        increment: u64,

        /// linear, linear-incremental or quadratic
        #[arg(long, default_value = "linear")]
        algorithm: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let load_config = || Config::load(cli.config.as_deref());

    match cli.command {
        Commands::Init { force } => {
            cli::init::init_command(cli.config.clone(), force).await?;
        }
        Commands::Configure { community, file } => {
            cli::configure::configure_command(&load_config()?, community.into(), &file).await?;
        }
        Commands::Replay { events, in_memory } => {
            cli::replay::replay_command(&load_config()?, &events, in_memory).await?;
        }
        Commands::Rank {
            community,
            participant,
        } => {
            cli::rank::rank_command(&load_config()?, community.into(), participant.into())
                .await?;
        }
        Commands::Leaderboard { community, limit } => {
            cli::leaderboard::leaderboard_command(&load_config()?, community.into(), limit)
                .await?;
        }
        Commands::Level {
            xp,
            increment,
            algorithm,
        } => {
            let algorithm = parse_algorithm(&algorithm)?;
            cli::level::level_command(xp, increment, algorithm)?;
        }
    }

    Ok(())
}

fn parse_algorithm(name: &str) -> Result<Algorithm> {
    serde_json::from_value(serde_json::Value::String(name.to_lowercase()))
        .map_err(|_| anyhow::anyhow!("Unknown algorithm: {}", name))
}
