//! Leveling core
//!
//! Pure pieces ([`Algorithm`], [`modifier`], [`roles`]) plus the stateful
//! components the [`LevelingPipeline`] owns ([`CooldownGate`],
//! [`XpAccrualStore`]).

mod accrual;
mod algorithm;
mod cooldown;
pub mod modifier;
pub mod notify;
mod pipeline;
pub mod roles;

pub use accrual::{Accrual, XpAccrualStore};
pub use algorithm::{Algorithm, LevelCalc, LevelInfo};
pub use cooldown::CooldownGate;
pub use modifier::ModifierTarget;
pub use pipeline::{AccrualReport, LevelingPipeline, PipelineOutcome, StepStatus};
pub use roles::RoleDelta;
