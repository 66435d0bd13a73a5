//! Inbound message event as delivered by the chat-platform binding

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{CategoryId, ChannelId, CommunityId, MessageId, ParticipantId, RoleId};
use super::record::ParticipantKey;

/// One message posted inside a community.
///
/// Direct messages never reach the leveling core, so `community_id` is
/// always present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub message_id: MessageId,
    pub participant_id: ParticipantId,
    pub community_id: CommunityId,
    pub channel_id: ChannelId,

    /// Category of the channel, if it belongs to one
    #[serde(default)]
    pub category_id: Option<CategoryId>,

    /// Roles the author currently holds in the community
    #[serde(default)]
    pub role_ids: HashSet<RoleId>,

    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub is_bot: bool,

    /// Display name of the community, used in direct notifications
    #[serde(default)]
    pub community_name: Option<String>,
}

impl InboundMessage {
    pub fn key(&self) -> ParticipantKey {
        ParticipantKey::new(self.participant_id, self.community_id)
    }
}
