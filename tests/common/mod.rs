//! Shared test utilities for pipeline integration tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use maelstrom::config::CommunityConfig;
use maelstrom::error::{PlatformError, StoreError};
use maelstrom::platform::ChatPlatform;
use maelstrom::store::{MemoryStore, PersistentStore};
use maelstrom::{
    CategoryId, ChannelId, CommunityId, InboundMessage, LevelingPipeline, MessageId,
    ParticipantId, ParticipantXpRecord, RoleId,
};

pub const COMMUNITY: CommunityId = CommunityId(1000);
pub const CHANNEL: ChannelId = ChannelId(2000);

/// Call made against the chat platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    AddRole(ParticipantId, RoleId),
    RemoveRole(ParticipantId, RoleId),
    Direct(ParticipantId, String),
    Channel(ChannelId, String),
    Reaction(MessageId, String),
}

/// Platform that records every call and can be told to fail
#[derive(Debug, Default)]
pub struct RecordingPlatform {
    calls: Mutex<Vec<PlatformCall>>,
    pub fail_roles: AtomicBool,
    pub fail_notifications: AtomicBool,
}

impl RecordingPlatform {
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: PlatformCall, fail: &AtomicBool) -> Result<(), PlatformError> {
        if fail.load(Ordering::SeqCst) {
            return Err(PlatformError::Forbidden(format!("{:?}", call)));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl ChatPlatform for RecordingPlatform {
    async fn add_role(
        &self,
        _community: CommunityId,
        participant: ParticipantId,
        role: RoleId,
    ) -> Result<(), PlatformError> {
        self.record(PlatformCall::AddRole(participant, role), &self.fail_roles)
    }

    async fn remove_role(
        &self,
        _community: CommunityId,
        participant: ParticipantId,
        role: RoleId,
    ) -> Result<(), PlatformError> {
        self.record(PlatformCall::RemoveRole(participant, role), &self.fail_roles)
    }

    async fn send_direct_notification(
        &self,
        participant: ParticipantId,
        text: &str,
    ) -> Result<(), PlatformError> {
        self.record(
            PlatformCall::Direct(participant, text.to_string()),
            &self.fail_notifications,
        )
    }

    async fn send_channel_notification(
        &self,
        channel: ChannelId,
        text: &str,
    ) -> Result<(), PlatformError> {
        self.record(
            PlatformCall::Channel(channel, text.to_string()),
            &self.fail_notifications,
        )
    }

    async fn add_reaction(
        &self,
        _channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), PlatformError> {
        self.record(
            PlatformCall::Reaction(message, emoji.to_string()),
            &self.fail_notifications,
        )
    }
}

/// Memory store whose writes can be made to fail and whose calls can be slowed down
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_writes: AtomicBool,
    pub delay: Option<Duration>,
}

impl FlakyStore {
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn check_writes(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PersistentStore for FlakyStore {
    async fn fetch_participant(
        &self,
        participant: ParticipantId,
        community: CommunityId,
    ) -> Result<Option<ParticipantXpRecord>, StoreError> {
        self.pause().await;
        self.inner.fetch_participant(participant, community).await
    }

    async fn create_participant(
        &self,
        participant: ParticipantId,
        community: CommunityId,
        initial_xp: u64,
    ) -> Result<(), StoreError> {
        self.pause().await;
        self.check_writes()?;
        self.inner
            .create_participant(participant, community, initial_xp)
            .await
    }

    async fn increment_xp(
        &self,
        participant: ParticipantId,
        community: CommunityId,
        delta: u64,
    ) -> Result<(), StoreError> {
        self.pause().await;
        self.check_writes()?;
        self.inner.increment_xp(participant, community, delta).await
    }

    async fn fetch_community_config(
        &self,
        community: CommunityId,
    ) -> Result<Option<CommunityConfig>, StoreError> {
        self.inner.fetch_community_config(community).await
    }
}

pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

/// Plain message from `participant` in [`COMMUNITY`]/[`CHANNEL`] at `secs`
pub fn message(participant: u64, secs: i64) -> InboundMessage {
    InboundMessage {
        message_id: MessageId(secs as u64 + 1),
        participant_id: ParticipantId(participant),
        community_id: COMMUNITY,
        channel_id: CHANNEL,
        category_id: None,
        role_ids: HashSet::new(),
        timestamp: at(secs),
        is_bot: false,
        community_name: Some("Rustaceans".to_string()),
    }
}

pub fn with_roles(mut message: InboundMessage, roles: &[u64]) -> InboundMessage {
    message.role_ids = roles.iter().map(|&r| RoleId(r)).collect();
    message
}

pub fn in_category(mut message: InboundMessage, category: u64) -> InboundMessage {
    message.category_id = Some(CategoryId(category));
    message
}

/// Config with a 10 second cooldown so tests can step past it quickly
pub fn fast_config() -> CommunityConfig {
    CommunityConfig {
        cooldown_seconds: 10,
        ..CommunityConfig::default()
    }
}

/// Pipeline over a fresh memory store holding `config` for [`COMMUNITY`]
pub fn pipeline_with(
    config: CommunityConfig,
) -> (LevelingPipeline, Arc<MemoryStore>, Arc<RecordingPlatform>) {
    let store = Arc::new(MemoryStore::new());
    store.put_community_config(COMMUNITY, &config).unwrap();
    let platform = Arc::new(RecordingPlatform::default());
    let pipeline = LevelingPipeline::new(store.clone(), platform.clone());
    (pipeline, store, platform)
}
