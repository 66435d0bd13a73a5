//! SQLite database connection and schema management for XP records
//!
//! Manages the `~/.maelstrom/maelstrom.db` database. Statements run on the
//! blocking thread pool so the async pipeline never stalls on disk I/O.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};

use super::PersistentStore;
use crate::config::CommunityConfig;
use crate::domain::{CommunityId, ParticipantId, ParticipantXpRecord};
use crate::error::StoreError;

/// How long a statement waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database wrapper shared by the pipeline and the standings queries
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create db dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open db: {}", path.display()))?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize schema")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Run a statement batch on the blocking pool
    async fn blocking<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&guard)
        })
        .await?
    }

    /// Flag or unflag a participant as banned, creating the record if needed.
    ///
    /// Callers must invalidate the pipeline's XP cache for this participant.
    pub fn set_banned(
        &self,
        participant: ParticipantId,
        community: CommunityId,
        banned: bool,
    ) -> Result<(), StoreError> {
        self.conn()?.execute(
            r#"INSERT INTO participants (participant_id, community_id, xp, banned)
               VALUES (?1, ?2, 0, ?3)
               ON CONFLICT(participant_id, community_id) DO UPDATE SET banned = ?3"#,
            rusqlite::params![participant.get(), community.get(), banned as i32],
        )?;
        Ok(())
    }

    /// Set a participant's XP back to zero. Returns false if no record existed.
    ///
    /// Callers must invalidate the pipeline's XP cache for this participant.
    pub fn reset_xp(
        &self,
        participant: ParticipantId,
        community: CommunityId,
    ) -> Result<bool, StoreError> {
        let changed = self.conn()?.execute(
            "UPDATE participants SET xp = 0 WHERE participant_id = ?1 AND community_id = ?2",
            rusqlite::params![participant.get(), community.get()],
        )?;
        Ok(changed > 0)
    }

    /// Store a community config in its persisted JSON shape
    pub fn put_community_config(
        &self,
        community: CommunityId,
        config: &CommunityConfig,
    ) -> Result<(), StoreError> {
        let json = config.to_json().map_err(|source| StoreError::InvalidConfig {
            community: community.get(),
            source,
        })?;
        self.conn()?.execute(
            r#"INSERT INTO communities (community_id, config, updated_at)
               VALUES (?1, ?2, ?3)
               ON CONFLICT(community_id) DO UPDATE SET config = ?2, updated_at = ?3"#,
            rusqlite::params![community.get(), json, Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }
}

fn read_participant(
    conn: &Connection,
    participant: ParticipantId,
    community: CommunityId,
) -> Result<Option<ParticipantXpRecord>, StoreError> {
    let record = conn
        .query_row(
            r#"SELECT xp, banned FROM participants
               WHERE participant_id = ?1 AND community_id = ?2"#,
            rusqlite::params![participant.get(), community.get()],
            |r| {
                Ok(ParticipantXpRecord {
                    participant_id: participant,
                    community_id: community,
                    xp_total: r.get(0)?,
                    banned: r.get::<_, i32>(1)? != 0,
                })
            },
        )
        .optional()?;
    Ok(record)
}

#[async_trait]
impl PersistentStore for SqliteStore {
    async fn fetch_participant(
        &self,
        participant: ParticipantId,
        community: CommunityId,
    ) -> Result<Option<ParticipantXpRecord>, StoreError> {
        self.blocking(move |conn| read_participant(conn, participant, community))
            .await
    }

    async fn create_participant(
        &self,
        participant: ParticipantId,
        community: CommunityId,
        initial_xp: u64,
    ) -> Result<(), StoreError> {
        self.blocking(move |conn| {
            conn.execute(
                r#"INSERT INTO participants (participant_id, community_id, xp, banned)
                   VALUES (?1, ?2, ?3, 0)"#,
                rusqlite::params![participant.get(), community.get(), initial_xp],
            )?;
            Ok(())
        })
        .await
    }

    async fn increment_xp(
        &self,
        participant: ParticipantId,
        community: CommunityId,
        delta: u64,
    ) -> Result<(), StoreError> {
        self.blocking(move |conn| {
            let changed = conn.execute(
                r#"UPDATE participants SET xp = xp + ?3
                   WHERE participant_id = ?1 AND community_id = ?2"#,
                rusqlite::params![participant.get(), community.get(), delta],
            )?;
            if changed == 0 {
                return Err(StoreError::MissingRecord {
                    participant: participant.get(),
                    community: community.get(),
                });
            }
            Ok(())
        })
        .await
    }

    async fn fetch_community_config(
        &self,
        community: CommunityId,
    ) -> Result<Option<CommunityConfig>, StoreError> {
        self.blocking(move |conn| {
            let json: Option<String> = conn
                .query_row(
                    "SELECT config FROM communities WHERE community_id = ?1",
                    [community.get()],
                    |r| r.get(0),
                )
                .optional()?;

            json.map(|json| {
                CommunityConfig::from_json(&json).map_err(|source| StoreError::InvalidConfig {
                    community: community.get(),
                    source,
                })
            })
            .transpose()
        })
        .await
    }
}

/// SQL schema for the XP database
const SCHEMA_SQL: &str = r#"
-- One row per (participant, community); never deleted by the leveling core
CREATE TABLE IF NOT EXISTS participants (
    participant_id INTEGER NOT NULL,
    community_id INTEGER NOT NULL,
    xp INTEGER NOT NULL DEFAULT 0,
    banned INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (participant_id, community_id)
);
CREATE INDEX IF NOT EXISTS idx_participants_xp ON participants(community_id, xp DESC);

-- Community configuration as JSON (legacy key names)
CREATE TABLE IF NOT EXISTS communities (
    community_id INTEGER PRIMARY KEY,
    config TEXT NOT NULL DEFAULT '{}',
    updated_at INTEGER NOT NULL
);

-- Schema version
CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
INSERT OR IGNORE INTO schema_version VALUES (1);
"#;
