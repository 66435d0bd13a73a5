//! Read-through cache for community configuration

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::PersistentStore;
use crate::config::CommunityConfig;
use crate::domain::CommunityId;
use crate::error::StoreError;

/// Caches configured communities after the first fetch.
///
/// Unconfigured communities are not cached so a later setup is picked up on
/// the next message.
#[derive(Debug, Default)]
pub struct CommunityConfigCache {
    entries: DashMap<CommunityId, Arc<CommunityConfig>>,
}

impl CommunityConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(
        &self,
        store: &dyn PersistentStore,
        community: CommunityId,
    ) -> Result<Option<Arc<CommunityConfig>>, StoreError> {
        if let Some(config) = self.entries.get(&community) {
            return Ok(Some(Arc::clone(config.value())));
        }

        let Some(config) = store.fetch_community_config(community).await? else {
            return Ok(None);
        };

        debug!("Cached config for community {}", community);
        let config = Arc::new(config);
        self.entries.insert(community, Arc::clone(&config));
        Ok(Some(config))
    }

    /// Forget a community's config after it was changed elsewhere
    pub fn invalidate(&self, community: CommunityId) {
        self.entries.remove(&community);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const C: CommunityId = CommunityId(1);

    #[tokio::test]
    async fn test_serves_cached_until_invalidated() {
        let store = MemoryStore::new();
        let cache = CommunityConfigCache::new();
        assert!(cache.get(&store, C).await.unwrap().is_none());

        store.put_community_config(C, &CommunityConfig::default()).unwrap();
        let first = cache.get(&store, C).await.unwrap().unwrap();
        assert_eq!(first.cooldown_seconds, 60);

        let mut changed = CommunityConfig::default();
        changed.cooldown_seconds = 20;
        store.put_community_config(C, &changed).unwrap();
        assert_eq!(cache.get(&store, C).await.unwrap().unwrap().cooldown_seconds, 60);

        cache.invalidate(C);
        assert_eq!(cache.get(&store, C).await.unwrap().unwrap().cooldown_seconds, 20);
    }
}
