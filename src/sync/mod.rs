//! Offline outbox for progress writes
//!
//! The engine never retries on its own. Clients that lose connectivity park
//! failed writes here and replay them later; replays are harmless because
//! every write is a merge.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::ContentCatalog;
use crate::config::write_atomic;
use crate::engine::{ProgressUpdate, ProgressionEngine};
use crate::progress::{LearnerId, ProgressError, ProgressRecord};
use crate::store::ProgressStore;

/// A write that could not be persisted yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingProgress {
    pub learner_id: LearnerId,
    #[serde(flatten)]
    pub update: ProgressUpdate,
    pub queued_at: DateTime<Utc>,
}

/// Result of recording through the outbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Stored(ProgressRecord),
    Queued,
}

/// Outcome of a flush
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub delivered: usize,
    /// Entries rejected by validation (e.g. unit removed from the catalog)
    pub dropped: usize,
    pub remaining: usize,
}

/// Ordered queue of pending writes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outbox {
    #[serde(default)]
    entries: Vec<PendingProgress>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file; a missing file is an empty outbox
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read outbox: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse outbox: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_vec_pretty(self).context("Failed to serialize outbox")?;
        write_atomic(path, &content)
    }

    pub fn entries(&self) -> &[PendingProgress] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, learner: LearnerId, update: ProgressUpdate, queued_at: DateTime<Utc>) {
        self.entries.push(PendingProgress {
            learner_id: learner,
            update,
            queued_at,
        });
    }

    /// Record through the engine, queueing the write on persistence failure.
    /// Validation errors are returned and never queued.
    pub async fn record_or_queue<S, C>(
        &mut self,
        engine: &ProgressionEngine<S, C>,
        learner: &LearnerId,
        update: ProgressUpdate,
    ) -> Result<Delivery, ProgressError>
    where
        S: ProgressStore,
        C: ContentCatalog,
    {
        let at = engine.now();
        match engine
            .record_progress_at(learner, &update.unit_id, update.percentage, update.completed, at)
            .await
        {
            Ok(record) => Ok(Delivery::Stored(record)),
            Err(e) if e.is_retryable() => {
                info!(learner = %learner, unit = %update.unit_id, "Store unreachable, queued progress");
                self.push(learner.clone(), update, at);
                Ok(Delivery::Queued)
            }
            Err(e) => Err(e),
        }
    }

    /// Replay pending writes of `learner` (all learners when `None`).
    ///
    /// Each write is recorded at its `queued_at` time, so an offline
    /// completion lands on the day it happened.
    ///
    /// Delivered and invalid entries leave the queue; entries that still hit
    /// persistence failures stay, in their original order.
    pub async fn flush<S, C>(
        &mut self,
        engine: &ProgressionEngine<S, C>,
        learner: Option<&LearnerId>,
    ) -> FlushReport
    where
        S: ProgressStore,
        C: ContentCatalog,
    {
        let mut report = FlushReport::default();
        let mut kept = Vec::with_capacity(self.entries.len());

        for entry in std::mem::take(&mut self.entries) {
            if learner.is_some_and(|l| l != &entry.learner_id) {
                kept.push(entry);
                continue;
            }
            let result = engine
                .record_progress_at(
                    &entry.learner_id,
                    &entry.update.unit_id,
                    entry.update.percentage,
                    entry.update.completed,
                    entry.queued_at,
                )
                .await;
            match result {
                Ok(_) => report.delivered += 1,
                Err(e) if e.is_retryable() => {
                    debug!(unit = %entry.update.unit_id, error = %e, "Still unreachable, keeping entry");
                    kept.push(entry);
                }
                Err(e) => {
                    warn!(unit = %entry.update.unit_id, error = %e, "Dropping invalid queued progress");
                    report.dropped += 1;
                }
            }
        }

        self.entries = kept;
        report.remaining = self.entries.len();
        report
    }
}
