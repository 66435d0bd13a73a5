//! In-memory store for dry runs (`maelstrom replay --in-memory`)

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::PersistentStore;
use crate::config::CommunityConfig;
use crate::domain::{CommunityId, ParticipantId, ParticipantKey, ParticipantXpRecord};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct MemoryState {
    participants: HashMap<ParticipantKey, ParticipantXpRecord>,
    communities: HashMap<CommunityId, CommunityConfig>,
}

/// Non-persistent [`PersistentStore`]; everything is lost on drop
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Poisoned)
    }

    pub fn put_community_config(
        &self,
        community: CommunityId,
        config: &CommunityConfig,
    ) -> Result<(), StoreError> {
        self.state()?.communities.insert(community, config.clone());
        Ok(())
    }

    pub fn set_banned(
        &self,
        participant: ParticipantId,
        community: CommunityId,
        banned: bool,
    ) -> Result<(), StoreError> {
        let key = ParticipantKey::new(participant, community);
        self.state()?
            .participants
            .entry(key)
            .or_insert_with(|| ParticipantXpRecord {
                participant_id: participant,
                community_id: community,
                xp_total: 0,
                banned: false,
            })
            .banned = banned;
        Ok(())
    }

    /// All records, highest XP first
    pub fn records(&self) -> Result<Vec<ParticipantXpRecord>, StoreError> {
        let mut records: Vec<_> = self.state()?.participants.values().cloned().collect();
        records.sort_by(|a, b| b.xp_total.cmp(&a.xp_total));
        Ok(records)
    }
}

#[async_trait]
impl PersistentStore for MemoryStore {
    async fn fetch_participant(
        &self,
        participant: ParticipantId,
        community: CommunityId,
    ) -> Result<Option<ParticipantXpRecord>, StoreError> {
        let key = ParticipantKey::new(participant, community);
        Ok(self.state()?.participants.get(&key).cloned())
    }

    async fn create_participant(
        &self,
        participant: ParticipantId,
        community: CommunityId,
        initial_xp: u64,
    ) -> Result<(), StoreError> {
        let key = ParticipantKey::new(participant, community);
        let mut state = self.state()?;
        if state.participants.contains_key(&key) {
            return Err(StoreError::DuplicateRecord {
                participant: participant.get(),
                community: community.get(),
            });
        }
        state.participants.insert(
            key,
            ParticipantXpRecord {
                participant_id: participant,
                community_id: community,
                xp_total: initial_xp,
                banned: false,
            },
        );
        Ok(())
    }

    async fn increment_xp(
        &self,
        participant: ParticipantId,
        community: CommunityId,
        delta: u64,
    ) -> Result<(), StoreError> {
        let key = ParticipantKey::new(participant, community);
        let mut state = self.state()?;
        let record = state
            .participants
            .get_mut(&key)
            .ok_or(StoreError::MissingRecord {
                participant: participant.get(),
                community: community.get(),
            })?;
        record.xp_total = record.xp_total.saturating_add(delta);
        Ok(())
    }

    async fn fetch_community_config(
        &self,
        community: CommunityId,
    ) -> Result<Option<CommunityConfig>, StoreError> {
        Ok(self.state()?.communities.get(&community).cloned())
    }
}
