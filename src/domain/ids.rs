//! Strongly typed platform ids
//!
//! The chat platform hands out 64-bit snowflakes for every kind of object.
//! Each kind gets its own newtype so a channel id can never be passed where
//! a role id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw platform id as stored in configuration maps and the database
pub type Snowflake = u64;

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Snowflake);

        impl $name {
            pub fn get(self) -> Snowflake {
                self.0
            }
        }

        impl From<Snowflake> for $name {
            fn from(raw: Snowflake) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake_id!(
    /// A member of a community who sends messages
    ParticipantId
);
snowflake_id!(
    /// A chat group/server; XP and roles are scoped to it
    CommunityId
);
snowflake_id!(ChannelId);
snowflake_id!(
    /// Channel category (a channel belongs to at most one)
    CategoryId
);
snowflake_id!(RoleId);
snowflake_id!(MessageId);
