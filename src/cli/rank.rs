//! Rank command implementation

use anyhow::{Context, Result};

use maelstrom::config::{CommunityConfig, Config};
use maelstrom::store::{PersistentStore, SqliteStore, StandingsQuery};
use maelstrom::{CommunityId, ParticipantId};

/// Stored config of a community, or an error telling the operator to configure it
pub(crate) async fn community_config(
    store: &SqliteStore,
    community: CommunityId,
) -> Result<CommunityConfig> {
    store
        .fetch_community_config(community)
        .await?
        .with_context(|| {
            format!(
                "Community {} is not configured. Run `maelstrom configure` first.",
                community
            )
        })
}

/// Show a participant's level and rank
pub async fn rank_command(
    config: &Config,
    community: CommunityId,
    participant: ParticipantId,
) -> Result<()> {
    let store = SqliteStore::open(&config.database_path())?;
    let community_config = community_config(&store, community).await?;

    let query = StandingsQuery::new(store);
    let Some(standing) = query.standing(participant, community, &community_config)? else {
        println!("Participant {} is not ranked in community {}.", participant, community);
        return Ok(());
    };

    println!("Participant {} in community {}:", participant, community);
    println!("  rank:  #{}", standing.rank);
    println!("  level: {}", standing.level);
    println!("  xp:    {}", standing.xp);
    println!(
        "  next:  {} XP to level {}",
        standing.xp_to_next,
        standing.level.saturating_add(1)
    );

    Ok(())
}
