//! Configure command implementation

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use maelstrom::config::{CommunityConfig, Config};
use maelstrom::store::SqliteStore;
use maelstrom::CommunityId;

/// Validate a community config file and store it in the database
pub async fn configure_command(config: &Config, community: CommunityId, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let community_config = CommunityConfig::from_json(&json)
        .with_context(|| format!("Invalid community config in {}", file.display()))?;

    let store = SqliteStore::open(&config.database_path())?;
    store.put_community_config(community, &community_config)?;

    info!("[maelstrom:configure] Stored config for community {}", community);
    println!("Community {} configured:", community);
    println!("  algorithm:  {}", community_config.algorithm.as_str());
    println!("  increment:  {}", community_config.increment);
    println!("  base xp:    {}", community_config.base_xp);
    println!("  cooldown:   {}s", community_config.cooldown_seconds);
    println!("  modifiers:  {}", community_config.modifiers.len());
    println!("  tier roles: {}", community_config.role_thresholds.len());

    Ok(())
}
