//! Level command implementation

use anyhow::{bail, Result};
use std::num::NonZeroU64;

use maelstrom::leveling::Algorithm;

/// Print the level an XP total reaches under an algorithm
pub fn level_command(xp: u64, increment: u64, algorithm: Algorithm) -> Result<()> {
    let Some(increment) = NonZeroU64::new(increment) else {
        bail!("Increment must be positive");
    };

    let info = algorithm.level_of(xp, increment);
    println!(
        "{} XP ({}, increment {}): level {}, {} XP to level {}",
        xp,
        algorithm.as_str(),
        increment,
        info.level,
        info.xp_to_next,
        info.level.saturating_add(1)
    );
    Ok(())
}
