//! Error types for the leveling core
//!
//! Only [`LevelingError`] aborts a pipeline run. Platform failures are
//! reported through [`PlatformError`] and degrade a single step.

use thiserror::Error;

/// Invalid community configuration, rejected when the stored config is loaded
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("increment must be positive")]
    ZeroIncrement,

    #[error("cooldown must be between {min} and {max} seconds, got {value}")]
    CooldownOutOfRange { value: u32, min: u32, max: u32 },

    #[error("modifier for {target} must be between 0 and {max}, got {value}")]
    ModifierOutOfRange { target: u64, value: f64, max: f64 },

    #[error("at most {max} role thresholds are allowed, got {count}")]
    TooManyRoleThresholds { count: usize, max: usize },

    #[error("role threshold levels must be positive")]
    ZeroLevelThreshold,

    #[error("malformed community config: {0}")]
    Malformed(String),
}

/// Persistent store failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("database connection poisoned")]
    Poisoned,

    #[error("invalid config for community {community}: {source}")]
    InvalidConfig {
        community: u64,
        #[source]
        source: ConfigError,
    },

    #[error("no XP record for participant {participant} in community {community}")]
    MissingRecord { participant: u64, community: u64 },

    #[error("XP record for participant {participant} in community {community} already exists")]
    DuplicateRecord { participant: u64, community: u64 },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Chat-platform call failure (never fatal to a pipeline run)
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("missing permission: {0}")]
    Forbidden(String),

    #[error("target not found: {0}")]
    NotFound(String),

    #[error("platform request failed: {0}")]
    Request(String),
}

/// Fatal failure of one message's pipeline run
#[derive(Debug, Error)]
pub enum LevelingError {
    #[error("persistent store failure: {0}")]
    Store(#[from] StoreError),
}
