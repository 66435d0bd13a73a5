//! Maelstrom - XP leveling core for chat communities
//!
//! For every inbound message Maelstrom decides whether, how much and under
//! what multiplier a participant's XP grows, detects level transitions and
//! keeps tier roles in sync with the participant's level.
//!
//! ## Components
//!
//! 1. **Leveling** ([`leveling`]): algorithms, modifier resolution, cooldowns,
//!    XP accrual, role sync and the [`LevelingPipeline`] that runs them in order.
//!
//! 2. **Collaborators**: the [`store::PersistentStore`] and
//!    [`platform::ChatPlatform`] traits, with SQLite, in-memory and logging
//!    implementations.

pub mod config;
pub mod domain;
pub mod error;
pub mod leveling;
pub mod platform;
pub mod store;

pub use domain::*;
pub use error::{ConfigError, LevelingError, PlatformError, StoreError};
pub use leveling::{LevelingPipeline, PipelineOutcome};
