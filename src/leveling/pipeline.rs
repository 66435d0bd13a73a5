//! Per-message leveling pipeline
//!
//! cooldown → modifier → accrual → algorithm → role sync → notification.
//! Cooldowns are measured against the message timestamp, so a replayed
//! history is gated the same way as live traffic.
//!
//! Only the accrual step can fail a run. Role sync and notifications run after
//! XP is committed and degrade independently; their status is reported in the
//! [`AccrualReport`].

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use super::accrual::{Accrual, XpAccrualStore};
use super::cooldown::CooldownGate;
use super::modifier;
use super::notify;
use super::roles::{self, RoleDelta};
use crate::config::{CommunityConfig, NotifyMethod};
use crate::domain::{CommunityId, InboundMessage, ParticipantId};
use crate::error::{LevelingError, PlatformError};
use crate::platform::ChatPlatform;
use crate::store::{CommunityConfigCache, PersistentStore};

/// How a best-effort step ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    /// Nothing to do
    Skipped,
    Done,
    Failed(String),
}

impl StepStatus {
    fn from_errors(errors: Vec<PlatformError>) -> Self {
        if errors.is_empty() {
            Self::Done
        } else {
            let reasons: Vec<String> = errors.iter().map(ToString::to_string).collect();
            Self::Failed(reasons.join("; "))
        }
    }
}

/// What a committed accrual did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccrualReport {
    pub granted: u64,
    pub before_xp: u64,
    pub after_xp: u64,
    pub level: u32,
    pub xp_to_next: u64,
    pub leveled_up: bool,
    pub roles: StepStatus,
    pub notification: StepStatus,
}

/// Result of running one message through the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Bot author
    Ignored,
    /// Community has no stored config
    Unconfigured,
    OnCooldown,
    /// Resolved multiplier is zero
    Muted,
    /// Multiplier was positive but the grant floored to zero
    ZeroGrant,
    Banned,
    Accrued(AccrualReport),
}

/// Orchestrates the leveling components for every inbound message.
///
/// Owns all process-local state (config cache, cooldown buckets, XP cache),
/// so independent pipelines never share it.
pub struct LevelingPipeline {
    store: Arc<dyn PersistentStore>,
    platform: Arc<dyn ChatPlatform>,
    configs: CommunityConfigCache,
    cooldowns: CooldownGate,
    accrual: XpAccrualStore,
}

impl LevelingPipeline {
    pub fn new(store: Arc<dyn PersistentStore>, platform: Arc<dyn ChatPlatform>) -> Self {
        Self {
            store,
            platform,
            configs: CommunityConfigCache::new(),
            cooldowns: CooldownGate::new(),
            accrual: XpAccrualStore::new(),
        }
    }

    pub fn cooldowns(&self) -> &CooldownGate {
        &self.cooldowns
    }

    /// Drop cached state for a participant after an administrative write
    pub fn invalidate_participant(&self, participant: ParticipantId, community: CommunityId) {
        self.accrual.invalidate(participant, community);
    }

    /// Drop cached config and totals for a community after it was reconfigured
    pub fn invalidate_community(&self, community: CommunityId) {
        self.configs.invalidate(community);
        self.accrual.invalidate_community(community);
    }

    /// Run one inbound message through the pipeline
    pub async fn handle(&self, message: &InboundMessage) -> Result<PipelineOutcome, LevelingError> {
        let start = Instant::now();
        let outcome = self.run(message).await;
        debug!(
            "[maelstrom:pipeline] message {} handled in {:?}",
            message.message_id,
            start.elapsed()
        );
        outcome
    }

    async fn run(&self, message: &InboundMessage) -> Result<PipelineOutcome, LevelingError> {
        if message.is_bot {
            return Ok(PipelineOutcome::Ignored);
        }

        let Some(config) = self.configs.get(self.store.as_ref(), message.community_id).await?
        else {
            debug!("Community {} is not set up", message.community_id);
            return Ok(PipelineOutcome::Unconfigured);
        };

        if self.cooldowns.check(
            message.participant_id,
            message.community_id,
            config.cooldown_seconds,
            message.timestamp,
        ) {
            debug!("Participant {} is on cooldown", message.participant_id);
            return Ok(PipelineOutcome::OnCooldown);
        }

        let multiplier = modifier::resolve(&modifier::targets_for(message), &config.modifiers);
        debug!("Overall modifier is {}", multiplier);
        if multiplier == 0.0 {
            return Ok(PipelineOutcome::Muted);
        }

        let granted = (config.base_xp as f64 * multiplier).floor() as u64;
        if granted == 0 {
            debug!("Modifier {} still floors the grant to 0, ignoring", multiplier);
            return Ok(PipelineOutcome::ZeroGrant);
        }

        let accrual = self
            .accrual
            .accrue(
                self.store.as_ref(),
                message.participant_id,
                message.community_id,
                granted,
            )
            .await
            .inspect_err(|e| {
                error!(
                    "[maelstrom:pipeline] Dropping XP for {} in {}: {}",
                    message.participant_id, message.community_id, e
                );
            })?;

        let (before_xp, after_xp) = match accrual {
            Accrual::Banned => {
                debug!("Participant {} is banned", message.participant_id);
                return Ok(PipelineOutcome::Banned);
            }
            Accrual::Applied { before_xp, after_xp } => (before_xp, after_xp),
        };

        let calc = config.algorithm.calc(before_xp, after_xp, config.increment);
        let roles = self.sync_roles(message, &config, calc.level).await;

        let notification = if calc.leveled_up {
            info!(
                "[maelstrom:pipeline] {} reached level {} in {}",
                message.participant_id, calc.level, message.community_id
            );
            self.notify_level_up(message, &config, calc.level, calc.xp_to_next)
                .await
        } else {
            StepStatus::Skipped
        };

        Ok(PipelineOutcome::Accrued(AccrualReport {
            granted,
            before_xp,
            after_xp,
            level: calc.level,
            xp_to_next: calc.xp_to_next,
            leveled_up: calc.leveled_up,
            roles,
            notification,
        }))
    }

    async fn sync_roles(
        &self,
        message: &InboundMessage,
        config: &CommunityConfig,
        level: u32,
    ) -> StepStatus {
        if config.role_thresholds.is_empty() {
            return StepStatus::Skipped;
        }

        let delta = roles::diff(&config.role_thresholds, &message.role_ids, level);
        if delta.is_empty() {
            return StepStatus::Skipped;
        }

        let errors = self.apply_roles(message, &delta).await;
        for e in &errors {
            warn!(
                "[maelstrom:pipeline] Role assignment failed for {}: {}",
                message.participant_id, e
            );
        }
        StepStatus::from_errors(errors)
    }

    /// Every change is attempted even after a failure
    async fn apply_roles(&self, message: &InboundMessage, delta: &RoleDelta) -> Vec<PlatformError> {
        let mut errors = Vec::new();

        if let Some(role) = delta.add {
            if let Err(e) = self
                .platform
                .add_role(message.community_id, message.participant_id, role)
                .await
            {
                errors.push(e);
            }
        }

        for &role in &delta.remove {
            if let Err(e) = self
                .platform
                .remove_role(message.community_id, message.participant_id, role)
                .await
            {
                errors.push(e);
            }
        }

        errors
    }

    async fn notify_level_up(
        &self,
        message: &InboundMessage,
        config: &CommunityConfig,
        level: u32,
        xp_to_next: u64,
    ) -> StepStatus {
        let Some(action) = &config.level_up else {
            return StepStatus::Skipped;
        };

        let sent = match action.method {
            NotifyMethod::Dm => {
                let community = message
                    .community_name
                    .clone()
                    .unwrap_or_else(|| message.community_id.to_string());
                let text = notify::direct_text(level, xp_to_next, &community);
                self.platform
                    .send_direct_notification(message.participant_id, &text)
                    .await
            }
            NotifyMethod::Chat => {
                let text = notify::channel_text(message.participant_id, level, xp_to_next);
                self.platform
                    .send_channel_notification(message.channel_id, &text)
                    .await
            }
            NotifyMethod::React => {
                self.platform
                    .add_reaction(message.channel_id, message.message_id, notify::LEVEL_UP_EMOJI)
                    .await
            }
        };

        match sent {
            Ok(()) => StepStatus::Done,
            Err(e) => {
                warn!(
                    "[maelstrom:pipeline] Level-up notification failed for {}: {}",
                    message.participant_id, e
                );
                StepStatus::Failed(e.to_string())
            }
        }
    }
}
