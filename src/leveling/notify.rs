//! Level-up announcement texts

use crate::domain::ParticipantId;

pub const LEVEL_UP_EMOJI: &str = "🎉";

/// Direct message to the participant
pub fn direct_text(level: u32, xp_to_next: u64, community: &str) -> String {
    format!(
        "🎉 Congrats! You levelled up to level {} in {}. You need {} more xp to get to level {}! 🎉",
        level,
        community,
        xp_to_next,
        level.saturating_add(1)
    )
}

/// Message posted in the channel the participant wrote in
pub fn channel_text(participant: ParticipantId, level: u32, xp_to_next: u64) -> String {
    format!(
        "🎉 Congrats <@{}>! You levelled up to level {}. You need {} more xp to get to level {}! 🎉",
        participant,
        level,
        xp_to_next,
        level.saturating_add(1)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_text() {
        assert_eq!(
            direct_text(3, 120, "Rustaceans"),
            "🎉 Congrats! You levelled up to level 3 in Rustaceans. You need 120 more xp to get to level 4! 🎉"
        );
    }

    #[test]
    fn test_channel_text_mentions_participant() {
        let text = channel_text(ParticipantId(42), 1, 300);
        assert!(text.starts_with("🎉 Congrats <@42>!"));
        assert!(text.contains("level 2!"));
    }
}
