//! Configuration loading and management
//!
//! Two layers live here: the operator's [`Config`] (a TOML file under
//! `~/.maelstrom/`) and the per-community [`CommunityConfig`] that the
//! persistent store hands to the leveling pipeline.

mod community;
mod io;
mod settings;

pub use community::{
    CommunityConfig, LevelUpAction, NotifyMethod, RawCommunityConfig, DEFAULT_BASE_XP,
    DEFAULT_COOLDOWN_SECS, DEFAULT_INCREMENT, MAX_COOLDOWN_SECS, MAX_MODIFIER,
    MAX_ROLE_THRESHOLDS, MIN_COOLDOWN_SECS,
};
pub use settings::Settings;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub settings: Settings,
}

impl Config {
    /// Database file to use: the configured path or `~/.maelstrom/maelstrom.db`
    pub fn database_path(&self) -> PathBuf {
        self.settings
            .database_path
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("maelstrom.db"))
    }
}
