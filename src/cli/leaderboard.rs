//! Leaderboard command implementation

use anyhow::Result;

use maelstrom::config::Config;
use maelstrom::store::{SqliteStore, StandingsQuery};
use maelstrom::CommunityId;

use super::rank::community_config;

/// Show the top participants of a community
pub async fn leaderboard_command(
    config: &Config,
    community: CommunityId,
    limit: Option<usize>,
) -> Result<()> {
    let store = SqliteStore::open(&config.database_path())?;
    let community_config = community_config(&store, community).await?;
    let limit = limit.unwrap_or(config.settings.leaderboard_size);

    let board = StandingsQuery::new(store).leaderboard(community, &community_config, limit)?;
    if board.is_empty() {
        println!("No participants found.");
        return Ok(());
    }

    println!("Leaderboard for community {} ({}):\n", community, board.len());
    for standing in board {
        println!(
            "  #{:<4} {:<20} level {:<4} {} XP",
            standing.rank, standing.participant_id.get(), standing.level, standing.xp
        );
    }

    Ok(())
}
