//! Chat-platform seam
//!
//! The leveling pipeline asks the platform binding to change roles and to
//! announce level-ups. Every call is best-effort from the pipeline's point of
//! view: a failure is logged and never undoes committed XP.

use async_trait::async_trait;
use tracing::info;

use crate::domain::{ChannelId, CommunityId, MessageId, ParticipantId, RoleId};
use crate::error::PlatformError;

/// Outbound calls to the chat platform
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    async fn add_role(
        &self,
        community: CommunityId,
        participant: ParticipantId,
        role: RoleId,
    ) -> Result<(), PlatformError>;

    async fn remove_role(
        &self,
        community: CommunityId,
        participant: ParticipantId,
        role: RoleId,
    ) -> Result<(), PlatformError>;

    async fn send_direct_notification(
        &self,
        participant: ParticipantId,
        text: &str,
    ) -> Result<(), PlatformError>;

    async fn send_channel_notification(
        &self,
        channel: ChannelId,
        text: &str,
    ) -> Result<(), PlatformError>;

    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), PlatformError>;
}

/// Platform that only logs what it was asked to do (used by `maelstrom replay`)
#[derive(Debug, Default)]
pub struct LogPlatform;

#[async_trait]
impl ChatPlatform for LogPlatform {
    async fn add_role(
        &self,
        community: CommunityId,
        participant: ParticipantId,
        role: RoleId,
    ) -> Result<(), PlatformError> {
        info!("[maelstrom:platform] add role {} to {} in {}", role, participant, community);
        Ok(())
    }

    async fn remove_role(
        &self,
        community: CommunityId,
        participant: ParticipantId,
        role: RoleId,
    ) -> Result<(), PlatformError> {
        info!("[maelstrom:platform] remove role {} from {} in {}", role, participant, community);
        Ok(())
    }

    async fn send_direct_notification(
        &self,
        participant: ParticipantId,
        text: &str,
    ) -> Result<(), PlatformError> {
        info!("[maelstrom:platform] dm {}: {}", participant, text);
        Ok(())
    }

    async fn send_channel_notification(
        &self,
        channel: ChannelId,
        text: &str,
    ) -> Result<(), PlatformError> {
        info!("[maelstrom:platform] #{}: {}", channel, text);
        Ok(())
    }

    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> Result<(), PlatformError> {
        info!("[maelstrom:platform] react {} on {}/{}", emoji, channel, message);
        Ok(())
    }
}
