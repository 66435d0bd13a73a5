//! Per-participant XP cooldown buckets
//!
//! Process-local and ephemeral: buckets are lost on restart.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::domain::{CommunityId, ParticipantId, ParticipantKey};

/// Earliest time each (participant, community) may earn XP again
#[derive(Debug, Default)]
pub struct CooldownGate {
    buckets: DashMap<ParticipantKey, DateTime<Utc>>,
}

impl CooldownGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate-and-arm: returns `true` while the bucket is still cooling down.
    ///
    /// Otherwise the bucket is re-armed to `now + cooldown_seconds` and
    /// `false` is returned. The shard lock held by the entry makes the check
    /// and the arm atomic for a key.
    pub fn check(
        &self,
        participant: ParticipantId,
        community: CommunityId,
        cooldown_seconds: u32,
        now: DateTime<Utc>,
    ) -> bool {
        let key = ParticipantKey::new(participant, community);
        let mut expires_at = self.buckets.entry(key).or_insert(DateTime::<Utc>::MIN_UTC);

        if *expires_at > now {
            return true;
        }

        *expires_at = now + Duration::seconds(i64::from(cooldown_seconds));
        false
    }

    /// Drop buckets that have already expired, returning how many were removed
    pub fn prune_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.buckets.len();
        self.buckets.retain(|_, expires_at| *expires_at > now);
        before.saturating_sub(self.buckets.len())
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
