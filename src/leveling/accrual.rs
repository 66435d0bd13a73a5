//! XP accrual: read-through cache plus incremental writes
//!
//! Every accrual for a (participant, community) key runs under that key's
//! async mutex, so two concurrent messages can never both read the same
//! stale total. Different keys proceed in parallel.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::{CommunityId, ParticipantId, ParticipantKey};
use crate::error::StoreError;
use crate::store::PersistentStore;

#[derive(Debug, Clone, Copy)]
struct CachedParticipant {
    xp: u64,
    banned: bool,
}

/// Outcome of one accrual
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accrual {
    /// Participant is banned; nothing was written
    Banned,
    Applied { before_xp: u64, after_xp: u64 },
}

/// Turns "add N XP" into before/after totals
#[derive(Default)]
pub struct XpAccrualStore {
    cache: DashMap<ParticipantKey, CachedParticipant>,
    locks: DashMap<ParticipantKey, Arc<Mutex<()>>>,
}

impl XpAccrualStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, key: ParticipantKey) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.entry(key).or_default().value())
    }

    /// Add `delta` XP, creating the record on first use.
    ///
    /// On a store error the cache entry is dropped and nothing is recorded,
    /// so the next message re-reads the persisted total.
    pub async fn accrue(
        &self,
        store: &dyn PersistentStore,
        participant: ParticipantId,
        community: CommunityId,
        delta: u64,
    ) -> Result<Accrual, StoreError> {
        let key = ParticipantKey::new(participant, community);
        let lock = self.lock_for(key);
        let guard = lock.lock().await;
        let result = self.accrue_locked(store, key, delta).await;
        drop(guard);
        drop(lock);

        // Only the map holds the lock now: no accrual is running or waiting on this key
        self.locks.remove_if(&key, |_, lock| Arc::strong_count(lock) == 1);
        result
    }

    async fn accrue_locked(
        &self,
        store: &dyn PersistentStore,
        key: ParticipantKey,
        delta: u64,
    ) -> Result<Accrual, StoreError> {
        let ParticipantKey {
            participant,
            community,
        } = key;

        let cached = self.cache.get(&key).map(|entry| *entry.value());
        let (before_xp, exists) = match cached {
            Some(entry) if entry.banned => return Ok(Accrual::Banned),
            Some(entry) => (entry.xp, true),
            None => match store.fetch_participant(participant, community).await? {
                None => (0, false),
                Some(record) if record.banned => {
                    self.cache.insert(
                        key,
                        CachedParticipant {
                            xp: record.xp_total,
                            banned: true,
                        },
                    );
                    return Ok(Accrual::Banned);
                }
                Some(record) => (record.xp_total, true),
            },
        };

        let after_xp = before_xp.saturating_add(delta);
        let written = if exists {
            store.increment_xp(participant, community, delta).await
        } else {
            debug!("Creating XP record for {} in {}", participant, community);
            store.create_participant(participant, community, after_xp).await
        };

        if let Err(e) = written {
            self.cache.remove(&key);
            return Err(e);
        }

        self.cache.insert(
            key,
            CachedParticipant {
                xp: after_xp,
                banned: false,
            },
        );
        Ok(Accrual::Applied { before_xp, after_xp })
    }

    /// Forget a participant's cached total after a write elsewhere (reset, ban)
    pub fn invalidate(&self, participant: ParticipantId, community: CommunityId) {
        self.cache.remove(&ParticipantKey::new(participant, community));
    }

    /// Forget every cached total of a community
    pub fn invalidate_community(&self, community: CommunityId) {
        self.cache.retain(|key, _| key.community != community);
    }

    pub fn cached_xp(&self, participant: ParticipantId, community: CommunityId) -> Option<u64> {
        self.cache
            .get(&ParticipantKey::new(participant, community))
            .map(|entry| entry.xp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const P: ParticipantId = ParticipantId(1);
    const C: CommunityId = CommunityId(2);

    #[tokio::test]
    async fn test_first_accrual_creates_record() {
        let store = MemoryStore::new();
        let accrual = XpAccrualStore::new();

        let result = accrual.accrue(&store, P, C, 30).await.unwrap();
        assert_eq!(result, Accrual::Applied { before_xp: 0, after_xp: 30 });

        let result = accrual.accrue(&store, P, C, 45).await.unwrap();
        assert_eq!(result, Accrual::Applied { before_xp: 30, after_xp: 75 });

        let record = store.fetch_participant(P, C).await.unwrap().unwrap();
        assert_eq!(record.xp_total, 75);
        assert_eq!(accrual.cached_xp(P, C), Some(75));
    }

    #[tokio::test]
    async fn test_zero_delta_changes_nothing() {
        let store = MemoryStore::new();
        let accrual = XpAccrualStore::new();
        accrual.accrue(&store, P, C, 100).await.unwrap();

        let result = accrual.accrue(&store, P, C, 0).await.unwrap();
        assert_eq!(result, Accrual::Applied { before_xp: 100, after_xp: 100 });
        assert_eq!(store.fetch_participant(P, C).await.unwrap().unwrap().xp_total, 100);
    }

    #[tokio::test]
    async fn test_banned_participant_is_untouched() {
        let store = MemoryStore::new();
        store.set_banned(P, C, true).unwrap();
        let accrual = XpAccrualStore::new();

        assert_eq!(accrual.accrue(&store, P, C, 30).await.unwrap(), Accrual::Banned);
        assert_eq!(accrual.accrue(&store, P, C, 30).await.unwrap(), Accrual::Banned);
        assert_eq!(store.fetch_participant(P, C).await.unwrap().unwrap().xp_total, 0);
    }

    #[tokio::test]
    async fn test_invalidate_rereads_store() {
        let store = MemoryStore::new();
        let accrual = XpAccrualStore::new();
        accrual.accrue(&store, P, C, 10).await.unwrap();

        store.set_banned(P, C, true).unwrap();
        // Cache still says not banned
        assert!(matches!(
            accrual.accrue(&store, P, C, 10).await.unwrap(),
            Accrual::Applied { after_xp: 20, .. }
        ));

        accrual.invalidate_community(C);
        assert_eq!(accrual.cached_xp(P, C), None);
        assert_eq!(accrual.accrue(&store, P, C, 10).await.unwrap(), Accrual::Banned);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_idle_key_locks_are_released() {
        let store = Arc::new(MemoryStore::new());
        let accrual = Arc::new(XpAccrualStore::new());

        for participant in 1..=50 {
            accrual.accrue(store.as_ref(), ParticipantId(participant), C, 5).await.unwrap();
        }
        assert!(accrual.locks.is_empty());

        let tasks: Vec<_> = (0..200)
            .map(|i| {
                let store = Arc::clone(&store);
                let accrual = Arc::clone(&accrual);
                tokio::spawn(async move {
                    let participant = ParticipantId(i % 4);
                    accrual.accrue(store.as_ref(), participant, C, 1).await.unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert!(accrual.locks.is_empty());
        for participant in 0..4 {
            let record = store.fetch_participant(ParticipantId(participant), C).await.unwrap();
            let expected = if participant == 1 { 5 + 50 } else { 50 };
            assert_eq!(record.unwrap().xp_total, expected);
        }
    }
}
