//! XP and Level system
//!
//! Maps accumulated XP to a level with one of three threshold schedules.
//! All variants are pure: the same `(xp, increment)` always yields the same
//! [`LevelInfo`].

use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

/// Leveling curve selected per community
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Every level costs `increment` XP
    #[default]
    Linear,
    /// Level `n` costs `(n + 1) * increment` XP
    #[serde(alias = "linearinc")]
    LinearIncremental,
    /// Closed form over triangular numbers, starting at level 1
    Quadratic,
}

/// Level position for a given XP total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    pub level: u32,
    /// XP still missing before the next level boundary
    pub xp_to_next: u64,
}

/// Result of comparing the level before and after an XP grant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelCalc {
    pub level: u32,
    pub xp_to_next: u64,
    pub leveled_up: bool,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::LinearIncremental => "linear-incremental",
            Self::Quadratic => "quadratic",
        }
    }

    /// Calculate level and XP to the next level
    pub fn level_of(&self, xp: u64, increment: NonZeroU64) -> LevelInfo {
        let inc = increment.get();
        match self {
            Self::Linear => LevelInfo {
                level: saturate(xp / inc),
                xp_to_next: inc - xp % inc,
            },
            Self::LinearIncremental => {
                let mut remaining = xp;
                let mut cost = inc;
                let mut level = 0u64;
                while remaining > cost {
                    remaining -= cost;
                    cost = cost.saturating_add(inc);
                    level += 1;
                }
                LevelInfo {
                    level: saturate(level),
                    xp_to_next: cost - remaining,
                }
            }
            Self::Quadratic => {
                let ratio = 8.0 * xp as f64 / inc as f64;
                let level = ((1.0 + (1.0 + ratio).sqrt()) / 2.0) as u64;
                LevelInfo {
                    level: saturate(level),
                    xp_to_next: quadratic_threshold(level + 1, inc).saturating_sub(xp),
                }
            }
        }
    }

    /// Level after a grant, and whether the grant crossed a level boundary
    pub fn calc(&self, before_xp: u64, after_xp: u64, increment: NonZeroU64) -> LevelCalc {
        let before = self.level_of(before_xp, increment);
        let after = self.level_of(after_xp, increment);
        LevelCalc {
            level: after.level,
            xp_to_next: after.xp_to_next,
            leveled_up: after.level > before.level,
        }
    }
}

/// Total XP at which the quadratic curve reaches `level`
fn quadratic_threshold(level: u64, inc: u64) -> u64 {
    let level = u128::from(level);
    // level * (level - 1) is always even
    let total = (level * level.saturating_sub(1) / 2).saturating_mul(u128::from(inc));
    u64::try_from(total).unwrap_or(u64::MAX)
}

fn saturate(level: u64) -> u32 {
    u32::try_from(level).unwrap_or(u32::MAX)
}
