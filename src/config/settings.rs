//! Settings configuration types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// SQLite database holding XP records and community configs.
    /// Defaults to `~/.maelstrom/maelstrom.db` when unset.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Maximum messages processed concurrently by `maelstrom replay`.
    /// Messages of the same participant are still serialized per community.
    #[serde(default = "default_replay_concurrency")]
    pub replay_concurrency: usize,

    /// Number of rows shown by `maelstrom leaderboard` without `--limit`
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
}

fn default_replay_concurrency() -> usize {
    8
}

fn default_leaderboard_size() -> usize {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: None,
            replay_concurrency: default_replay_concurrency(),
            leaderboard_size: default_leaderboard_size(),
        }
    }
}
