use serde::{Deserialize, Serialize};

use super::ids::{CommunityId, ParticipantId};

/// Identifies one participant inside one community.
///
/// XP records, cooldown buckets and accrual locks are all keyed by this pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantKey {
    pub participant: ParticipantId,
    pub community: CommunityId,
}

impl ParticipantKey {
    pub fn new(participant: ParticipantId, community: CommunityId) -> Self {
        Self {
            participant,
            community,
        }
    }
}

/// Persisted XP state for one (participant, community) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantXpRecord {
    pub participant_id: ParticipantId,
    pub community_id: CommunityId,
    pub xp_total: u64,
    pub banned: bool,
}
