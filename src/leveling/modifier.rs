//! XP multiplier resolution
//!
//! Overrides are stored as a flat `id -> multiplier` map. The message context
//! classifies each id it knows about into a [`ModifierTarget`] once, and the
//! resolver walks those targets by precedence:
//!
//! participant > channel > category > highest role override > default (1).
//!
//! A zero override on any applicable target mutes the message outright.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{CategoryId, ChannelId, InboundMessage, ParticipantId, RoleId, Snowflake};

pub const DEFAULT_MULTIPLIER: f64 = 1.0;

/// An id from the message context, tagged with what it denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierTarget {
    Participant(ParticipantId),
    Channel(ChannelId),
    Category(CategoryId),
    Role(RoleId),
}

impl ModifierTarget {
    pub fn raw_id(&self) -> Snowflake {
        match self {
            Self::Participant(id) => id.get(),
            Self::Channel(id) => id.get(),
            Self::Category(id) => id.get(),
            Self::Role(id) => id.get(),
        }
    }

    /// Lower wins
    fn precedence(&self) -> u8 {
        match self {
            Self::Participant(_) => 0,
            Self::Channel(_) => 1,
            Self::Category(_) => 2,
            Self::Role(_) => 3,
        }
    }
}

/// Classify every id of the message that may carry an override
pub fn targets_for(message: &InboundMessage) -> Vec<ModifierTarget> {
    let mut targets = vec![
        ModifierTarget::Participant(message.participant_id),
        ModifierTarget::Channel(message.channel_id),
    ];
    if let Some(category) = message.category_id {
        targets.push(ModifierTarget::Category(category));
    }
    targets.extend(message.role_ids.iter().copied().map(ModifierTarget::Role));
    targets
}

/// Resolve the overall multiplier for a set of classified targets
pub fn resolve(targets: &[ModifierTarget], overrides: &HashMap<Snowflake, f64>) -> f64 {
    let mut best: Option<(u8, f64)> = None;
    let mut best_role: Option<f64> = None;

    for target in targets {
        let Some(&multiplier) = overrides.get(&target.raw_id()) else {
            continue;
        };

        if multiplier == 0.0 {
            debug!("{:?} has modifier overridden to 0", target);
            return 0.0;
        }

        match target {
            ModifierTarget::Role(_) => {
                best_role = Some(best_role.map_or(multiplier, |current| current.max(multiplier)));
            }
            _ => {
                let rank = target.precedence();
                if best.is_none_or(|(current, _)| rank < current) {
                    best = Some((rank, multiplier));
                }
            }
        }
    }

    best.map(|(_, multiplier)| multiplier)
        .or(best_role)
        .unwrap_or(DEFAULT_MULTIPLIER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(entries: &[(Snowflake, f64)]) -> HashMap<Snowflake, f64> {
        entries.iter().copied().collect()
    }

    fn context(roles: &[u64]) -> Vec<ModifierTarget> {
        let mut targets = vec![
            ModifierTarget::Participant(ParticipantId(1)),
            ModifierTarget::Channel(ChannelId(2)),
            ModifierTarget::Category(CategoryId(3)),
        ];
        targets.extend(roles.iter().map(|&r| ModifierTarget::Role(RoleId(r))));
        targets
    }

    #[test]
    fn test_default_when_nothing_applies() {
        assert_eq!(resolve(&context(&[10]), &overrides(&[(999, 3.0)])), 1.0);
    }

    #[test]
    fn test_participant_beats_category() {
        let table = overrides(&[(1, 0.5), (3, 2.0)]);
        assert_eq!(resolve(&context(&[]), &table), 0.5);
    }

    #[test]
    fn test_channel_beats_category_and_roles() {
        let table = overrides(&[(2, 1.5), (3, 2.0), (10, 4.0)]);
        assert_eq!(resolve(&context(&[10]), &table), 1.5);
    }

    #[test]
    fn test_order_of_targets_does_not_matter() {
        let table = overrides(&[(1, 0.5), (2, 3.0)]);
        let mut targets = context(&[]);
        targets.reverse();
        assert_eq!(resolve(&targets, &table), 0.5);
    }

    #[test]
    fn test_highest_role_wins() {
        let table = overrides(&[(10, 1.5), (11, 3.0), (12, 2.0)]);
        assert_eq!(resolve(&context(&[10, 11, 12]), &table), 3.0);
    }

    #[test]
    fn test_zero_role_vetoes() {
        let table = overrides(&[(10, 0.0)]);
        assert_eq!(resolve(&context(&[10]), &table), 0.0);
    }

    #[test]
    fn test_zero_anywhere_vetoes_higher_precedence() {
        let table = overrides(&[(1, 2.0), (3, 0.0)]);
        assert_eq!(resolve(&context(&[]), &table), 0.0);

        let table = overrides(&[(1, 2.0), (11, 0.0), (10, 4.0)]);
        assert_eq!(resolve(&context(&[10, 11]), &table), 0.0);
    }

    #[test]
    fn test_targets_for_message() {
        let message = InboundMessage {
            message_id: crate::domain::MessageId(9),
            participant_id: ParticipantId(1),
            community_id: crate::domain::CommunityId(5),
            channel_id: ChannelId(2),
            category_id: None,
            role_ids: [RoleId(10)].into_iter().collect(),
            timestamp: chrono::Utc::now(),
            is_bot: false,
            community_name: None,
        };
        let targets = targets_for(&message);
        assert_eq!(targets.len(), 3);
        assert!(!targets.iter().any(|t| matches!(t, ModifierTarget::Category(_))));
        assert!(targets.contains(&ModifierTarget::Role(RoleId(10))));
    }
}
