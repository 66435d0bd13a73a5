//! Persistent storage for XP records and community configuration
//!
//! The leveling pipeline only talks to [`PersistentStore`]. Two
//! implementations ship with the crate: [`SqliteStore`] (`~/.maelstrom/maelstrom.db`)
//! and [`MemoryStore`] for dry runs.
//!
//! # Usage
//!
//! ```ignore
//! let store = SqliteStore::open(&config.database_path())?;
//! store.put_community_config(community, &CommunityConfig::default())?;
//!
//! let pipeline = LevelingPipeline::new(Arc::new(store), platform);
//! pipeline.handle(&message).await?;
//! ```

mod config_cache;
mod memory;
mod sqlite;
mod standings;

pub use config_cache::CommunityConfigCache;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use standings::{Standing, StandingsQuery};

use async_trait::async_trait;

use crate::config::CommunityConfig;
use crate::domain::{CommunityId, ParticipantId, ParticipantXpRecord};
use crate::error::StoreError;

/// Outbound calls to the persistent store.
///
/// Calls are the only suspension points of the pipeline; implementations
/// bound them with their own timeout policy.
#[async_trait]
pub trait PersistentStore: Send + Sync {
    async fn fetch_participant(
        &self,
        participant: ParticipantId,
        community: CommunityId,
    ) -> Result<Option<ParticipantXpRecord>, StoreError>;

    async fn create_participant(
        &self,
        participant: ParticipantId,
        community: CommunityId,
        initial_xp: u64,
    ) -> Result<(), StoreError>;

    /// Add `delta` to the stored total (`xp = xp + delta`), never overwrite
    async fn increment_xp(
        &self,
        participant: ParticipantId,
        community: CommunityId,
        delta: u64,
    ) -> Result<(), StoreError>;

    /// Validated community config, `None` when the community is not set up
    async fn fetch_community_config(
        &self,
        community: CommunityId,
    ) -> Result<Option<CommunityConfig>, StoreError>;
}
