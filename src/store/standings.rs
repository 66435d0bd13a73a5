//! Rank and leaderboard queries over the SQLite store

use rusqlite::OptionalExtension;

use super::SqliteStore;
use crate::config::CommunityConfig;
use crate::domain::{CommunityId, ParticipantId, ParticipantXpRecord};
use crate::error::StoreError;

/// A participant's position in a community
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub participant_id: ParticipantId,
    pub xp: u64,
    pub level: u32,
    pub xp_to_next: u64,
    /// 1-based; ties share the better rank
    pub rank: u64,
}

/// Query interface for rankings
pub struct StandingsQuery {
    db: SqliteStore,
}

impl StandingsQuery {
    pub fn new(db: SqliteStore) -> Self {
        Self { db }
    }

    /// Highest XP first; banned participants are left out
    pub fn top_participants(
        &self,
        community: CommunityId,
        limit: usize,
    ) -> Result<Vec<ParticipantXpRecord>, StoreError> {
        let conn = self.db.conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT participant_id, xp FROM participants
               WHERE community_id = ?1 AND banned = 0
               ORDER BY xp DESC, participant_id ASC
               LIMIT ?2"#,
        )?;
        let rows = stmt.query_map(rusqlite::params![community.get(), limit as i64], |r| {
            Ok(ParticipantXpRecord {
                participant_id: ParticipantId(r.get(0)?),
                community_id: community,
                xp_total: r.get(1)?,
                banned: false,
            })
        })?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// 1-based rank by XP, `None` if the participant has no record or is banned
    pub fn rank_of(
        &self,
        participant: ParticipantId,
        community: CommunityId,
    ) -> Result<Option<u64>, StoreError> {
        Ok(self.xp_and_rank(participant, community)?.map(|(_, rank)| rank))
    }

    /// Full standing of one participant under the community's curve
    pub fn standing(
        &self,
        participant: ParticipantId,
        community: CommunityId,
        config: &CommunityConfig,
    ) -> Result<Option<Standing>, StoreError> {
        let Some((xp, rank)) = self.xp_and_rank(participant, community)? else {
            return Ok(None);
        };
        let info = config.algorithm.level_of(xp, config.increment);

        Ok(Some(Standing {
            participant_id: participant,
            xp,
            level: info.level,
            xp_to_next: info.xp_to_next,
            rank,
        }))
    }

    fn xp_and_rank(
        &self,
        participant: ParticipantId,
        community: CommunityId,
    ) -> Result<Option<(u64, u64)>, StoreError> {
        let conn = self.db.conn()?;
        let row: Option<(u64, bool)> = conn
            .query_row(
                "SELECT xp, banned FROM participants WHERE participant_id = ?1 AND community_id = ?2",
                rusqlite::params![participant.get(), community.get()],
                |r| Ok((r.get(0)?, r.get::<_, i32>(1)? != 0)),
            )
            .optional()?;

        // Banned participants are off the board, same as top_participants
        let Some((xp, false)) = row else {
            return Ok(None);
        };

        let ahead: u64 = conn.query_row(
            "SELECT COUNT(*) FROM participants WHERE community_id = ?1 AND banned = 0 AND xp > ?2",
            rusqlite::params![community.get(), xp],
            |r| r.get(0),
        )?;
        Ok(Some((xp, ahead + 1)))
    }

    /// Top `limit` standings
    pub fn leaderboard(
        &self,
        community: CommunityId,
        config: &CommunityConfig,
        limit: usize,
    ) -> Result<Vec<Standing>, StoreError> {
        let top = self.top_participants(community, limit)?;
        let mut standings = Vec::with_capacity(top.len());
        let mut rank = 0;
        let mut previous_xp = None;

        for (position, record) in top.into_iter().enumerate() {
            if previous_xp != Some(record.xp_total) {
                rank = position as u64 + 1;
                previous_xp = Some(record.xp_total);
            }
            let info = config.algorithm.level_of(record.xp_total, config.increment);
            standings.push(Standing {
                participant_id: record.participant_id,
                xp: record.xp_total,
                level: info.level,
                xp_to_next: info.xp_to_next,
                rank,
            });
        }
        Ok(standings)
    }
}
