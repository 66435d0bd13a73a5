//! Per-community leveling configuration
//!
//! Stored as JSON by the configuration collaborator using the bot's legacy
//! key names. Every key may be missing; defaults are substituted here and all
//! values are validated once, so the pipeline only ever sees a well-formed
//! [`CommunityConfig`].

use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use crate::domain::{RoleId, Snowflake};
use crate::error::ConfigError;
use crate::leveling::Algorithm;

pub const DEFAULT_INCREMENT: NonZeroU64 = NonZeroU64::new(300).unwrap();
pub const DEFAULT_BASE_XP: u64 = 30;
pub const DEFAULT_COOLDOWN_SECS: u32 = 60;
pub const MIN_COOLDOWN_SECS: u32 = 10;
pub const MAX_COOLDOWN_SECS: u32 = 3600;
pub const MAX_MODIFIER: f64 = 5.0;
pub const MAX_ROLE_THRESHOLDS: usize = 25;

/// How a level-up is announced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyMethod {
    /// Direct message to the participant
    #[default]
    Dm,
    /// Message in the channel the participant wrote in
    Chat,
    /// Reaction on the triggering message
    React,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpAction {
    #[serde(default)]
    pub method: NotifyMethod,
}

/// Validated configuration for one community
#[derive(Debug, Clone, PartialEq)]
pub struct CommunityConfig {
    /// XP per level unit, fed to the leveling algorithm
    pub increment: NonZeroU64,
    /// XP granted per qualifying message before the modifier
    pub base_xp: u64,
    /// Multiplier overrides keyed by participant, channel, category or role id
    pub modifiers: HashMap<Snowflake, f64>,
    pub cooldown_seconds: u32,
    pub algorithm: Algorithm,
    /// `None` disables level-up announcements
    pub level_up: Option<LevelUpAction>,
    /// Tier role granted from each level upwards
    pub role_thresholds: BTreeMap<u32, RoleId>,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            increment: DEFAULT_INCREMENT,
            base_xp: DEFAULT_BASE_XP,
            modifiers: HashMap::new(),
            cooldown_seconds: DEFAULT_COOLDOWN_SECS,
            algorithm: Algorithm::default(),
            level_up: None,
            role_thresholds: BTreeMap::new(),
        }
    }
}

/// Community config exactly as persisted (all keys optional)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCommunityConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment: Option<u64>,

    #[serde(default, rename = "default", skip_serializing_if = "Option::is_none")]
    pub base_xp: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<HashMap<Snowflake, f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<Algorithm>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levelup: Option<LevelUpAction>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<BTreeMap<u32, RoleId>>,
}

impl CommunityConfig {
    /// Parse and validate a stored JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawCommunityConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        Self::try_from(raw)
    }

    /// Serialize back to the stored JSON shape
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string(&RawCommunityConfig::from(self))
            .map_err(|e| ConfigError::Malformed(e.to_string()))
    }
}

impl TryFrom<RawCommunityConfig> for CommunityConfig {
    type Error = ConfigError;

    fn try_from(raw: RawCommunityConfig) -> Result<Self, Self::Error> {
        let increment = match raw.increment {
            Some(value) => NonZeroU64::new(value).ok_or(ConfigError::ZeroIncrement)?,
            None => DEFAULT_INCREMENT,
        };

        let cooldown_seconds = raw.cooldown.unwrap_or(DEFAULT_COOLDOWN_SECS);
        if !(MIN_COOLDOWN_SECS..=MAX_COOLDOWN_SECS).contains(&cooldown_seconds) {
            return Err(ConfigError::CooldownOutOfRange {
                value: cooldown_seconds,
                min: MIN_COOLDOWN_SECS,
                max: MAX_COOLDOWN_SECS,
            });
        }

        let modifiers = raw.modifiers.unwrap_or_default();
        if let Some((&target, &value)) = modifiers
            .iter()
            .find(|(_, v)| !(0.0..=MAX_MODIFIER).contains(*v))
        {
            return Err(ConfigError::ModifierOutOfRange {
                target,
                value,
                max: MAX_MODIFIER,
            });
        }

        let role_thresholds = raw.roles.unwrap_or_default();
        if role_thresholds.len() > MAX_ROLE_THRESHOLDS {
            return Err(ConfigError::TooManyRoleThresholds {
                count: role_thresholds.len(),
                max: MAX_ROLE_THRESHOLDS,
            });
        }
        if role_thresholds.contains_key(&0) {
            return Err(ConfigError::ZeroLevelThreshold);
        }

        Ok(Self {
            increment,
            base_xp: raw.base_xp.unwrap_or(DEFAULT_BASE_XP),
            modifiers,
            cooldown_seconds,
            algorithm: raw.algorithm.unwrap_or_default(),
            level_up: raw.levelup,
            role_thresholds,
        })
    }
}

impl From<&CommunityConfig> for RawCommunityConfig {
    fn from(config: &CommunityConfig) -> Self {
        Self {
            increment: Some(config.increment.get()),
            base_xp: Some(config.base_xp),
            modifiers: Some(config.modifiers.clone()),
            cooldown: Some(config.cooldown_seconds),
            algorithm: Some(config.algorithm),
            levelup: config.level_up,
            roles: Some(config.role_thresholds.clone()),
        }
    }
}
