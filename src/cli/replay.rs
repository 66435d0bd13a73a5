//! Replay command implementation
//!
//! Feeds recorded inbound messages through a [`LevelingPipeline`] backed by a
//! logging chat platform. Messages are processed in batches. Within a batch each
//! (participant, community) lane keeps file order while up to
//! `settings.replay_concurrency` lanes run at once.

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use maelstrom::config::{CommunityConfig, Config};
use maelstrom::leveling::{LevelingPipeline, PipelineOutcome};
use maelstrom::platform::LogPlatform;
use maelstrom::store::{MemoryStore, PersistentStore, SqliteStore};
use maelstrom::InboundMessage;

const BATCH_SIZE: usize = 512;

/// Parse a JSON-lines event file, skipping blank lines
pub fn read_events(path: &Path) -> Result<Vec<InboundMessage>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read events file: {}", path.display()))?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Invalid event on line {}", index + 1))
        })
        .collect()
}

/// Tally of pipeline outcomes
#[derive(Debug, Default)]
pub struct ReplaySummary {
    pub outcomes: BTreeMap<&'static str, usize>,
    pub xp_granted: u64,
    pub level_ups: usize,
    pub failed: usize,
}

impl ReplaySummary {
    fn record(&mut self, outcome: &PipelineOutcome) {
        let name = match outcome {
            PipelineOutcome::Ignored => "ignored",
            PipelineOutcome::Unconfigured => "unconfigured",
            PipelineOutcome::OnCooldown => "on cooldown",
            PipelineOutcome::Muted => "muted",
            PipelineOutcome::ZeroGrant => "zero grant",
            PipelineOutcome::Banned => "banned",
            PipelineOutcome::Accrued(report) => {
                self.xp_granted += report.granted;
                if report.leveled_up {
                    self.level_ups += 1;
                }
                "accrued"
            }
        };
        *self.outcomes.entry(name).or_default() += 1;
    }
}

/// Run every event through one pipeline and return the tally
pub async fn replay(
    pipeline: &LevelingPipeline,
    events: Vec<InboundMessage>,
    concurrency: usize,
) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    let concurrency = concurrency.max(1);

    for batch in events.chunks(BATCH_SIZE) {
        let mut lanes: HashMap<_, Vec<&InboundMessage>> = HashMap::new();
        for message in batch {
            lanes.entry(message.key()).or_default().push(message);
        }

        let results: Vec<_> = stream::iter(lanes.into_values())
            .map(|lane| async move {
                let mut results = Vec::with_capacity(lane.len());
                for message in lane {
                    results.push(pipeline.handle(message).await);
                }
                results
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        for result in results.into_iter().flatten() {
            match result {
                Ok(outcome) => summary.record(&outcome),
                Err(e) => {
                    warn!("[maelstrom:replay] Message failed: {}", e);
                    summary.failed += 1;
                }
            }
        }

        if let Some(latest) = batch.iter().map(|m| m.timestamp).max() {
            let pruned = pipeline.cooldowns().prune_expired(latest);
            if pruned > 0 {
                tracing::debug!("Pruned {} expired cooldowns", pruned);
            }
        }
    }

    summary
}

/// Replay an events file against the database or a throwaway store.
///
/// With `--in-memory` every community in the file runs with the default
/// community config.
pub async fn replay_command(config: &Config, events_path: &Path, in_memory: bool) -> Result<()> {
    let events = read_events(events_path)?;
    info!(
        "[maelstrom:replay] Replaying {} events from {}",
        events.len(),
        events_path.display()
    );

    let store: Arc<dyn PersistentStore> = if in_memory {
        let store = MemoryStore::new();
        let communities: BTreeSet<_> = events.iter().map(|m| m.community_id).collect();
        let defaults = CommunityConfig::default();
        for community in communities {
            store.put_community_config(community, &defaults)?;
        }
        Arc::new(store)
    } else {
        Arc::new(SqliteStore::open(&config.database_path())?)
    };

    let pipeline = LevelingPipeline::new(store, Arc::new(LogPlatform));
    let summary = replay(&pipeline, events, config.settings.replay_concurrency).await;

    println!("Replay finished:");
    for (outcome, count) in &summary.outcomes {
        println!("  {:<14} {}", outcome, count);
    }
    if summary.failed > 0 {
        println!("  {:<14} {}", "failed", summary.failed);
    }
    println!("  XP granted:    {}", summary.xp_granted);
    println!("  Level-ups:     {}", summary.level_ups);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use maelstrom::{ChannelId, CommunityId, MessageId, ParticipantId};

    fn message(id: u64, participant: u64, secs: i64) -> InboundMessage {
        InboundMessage {
            message_id: MessageId(id),
            participant_id: ParticipantId(participant),
            community_id: CommunityId(1),
            channel_id: ChannelId(10),
            category_id: None,
            role_ids: Default::default(),
            timestamp: DateTime::<Utc>::from_timestamp(secs, 0).unwrap(),
            is_bot: false,
            community_name: None,
        }
    }

    #[test]
    fn test_read_events_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let line = serde_json::to_string(&message(1, 2, 0)).unwrap();
        std::fs::write(&path, format!("{}\n\n{}\n", line, line)).unwrap();

        assert_eq!(read_events(&path).unwrap().len(), 2);

        std::fs::write(&path, "{not json}\n").unwrap();
        assert!(read_events(&path).is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_replay_gates_by_message_time() {
        let store = MemoryStore::new();
        store
            .put_community_config(CommunityId(1), &CommunityConfig::default())
            .unwrap();
        let pipeline = LevelingPipeline::new(Arc::new(store), Arc::new(LogPlatform));

        // Participant 1 writes every 30s for 10 minutes: one grant per minute
        let mut events: Vec<_> = (0..20).map(|i| message(i, 1, i as i64 * 30)).collect();
        events.push(message(100, 2, 0));

        let summary = replay(&pipeline, events, 4).await;
        assert_eq!(summary.outcomes.get("accrued"), Some(&11));
        assert_eq!(summary.outcomes.get("on cooldown"), Some(&10));
        assert_eq!(summary.xp_granted, 11 * 30);
        assert_eq!(summary.failed, 0);
    }
}
