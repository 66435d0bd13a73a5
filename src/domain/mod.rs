//! Core domain types for Maelstrom

mod ids;
mod message;
mod record;

pub use ids::{CategoryId, ChannelId, CommunityId, MessageId, ParticipantId, RoleId, Snowflake};
pub use message::InboundMessage;
pub use record::{ParticipantKey, ParticipantXpRecord};
