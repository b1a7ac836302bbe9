//! Progression engine: completion recording, profile derivation, resets
//!
//! The engine holds no mutable state of its own. Every operation reads from
//! the [`ProgressStore`], and the only write path for progress is a merge,
//! so any call can be retried or replayed from any session.
//!
//! # Usage
//!
//! ```ignore
//! let engine = ProgressionEngine::new(store, catalog, EngineSettings::default());
//!
//! engine.record_progress(&learner, &unit, 100, true).await?;
//! let profile = engine.get_profile(&learner).await?;
//! ```

mod aggregate;
mod clock;
mod levels;
mod streaks;

pub use aggregate::{derive_profile, derive_scope_progress, ProfileAggregate, ScopeProgress};
pub use clock::{Clock, FixedClock, SystemClock};
pub use levels::{level_for_xp, title_for_level, LevelProgress, TITLES, XP_PER_LEVEL};
pub use streaks::{completion_days, StreakInfo};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::ContentCatalog;
use crate::config::EngineSettings;
use crate::progress::{merge, LearnerId, ProgressError, ProgressRecord, ScopeId, UnitId};
use crate::store::ProgressStore;

/// One reported observation for a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub unit_id: UnitId,
    pub percentage: u32,
    pub completed: bool,
}

/// Core of the progression system
pub struct ProgressionEngine<S, C> {
    store: S,
    catalog: C,
    settings: EngineSettings,
    clock: Arc<dyn Clock>,
}

impl<S: ProgressStore, C: ContentCatalog> ProgressionEngine<S, C> {
    pub fn new(store: S, catalog: C, settings: EngineSettings) -> Self {
        Self {
            store,
            catalog,
            settings,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the wall clock, e.g. with a [`FixedClock`]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Current time on the engine's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ========================================
    // VALIDATION
    // ========================================

    fn check_learner(learner: &LearnerId) -> Result<(), ProgressError> {
        if learner.as_str().trim().is_empty() {
            return Err(ProgressError::EmptyLearnerId);
        }
        Ok(())
    }

    fn check_unit(&self, unit: &UnitId) -> Result<(), ProgressError> {
        if self.catalog.unit(unit).is_none() {
            return Err(ProgressError::UnknownUnit(unit.clone()));
        }
        Ok(())
    }

    fn check_percentage(percentage: u32) -> Result<u8, ProgressError> {
        match u8::try_from(percentage) {
            Ok(p) if p <= 100 => Ok(p),
            _ => Err(ProgressError::InvalidPercentage(percentage)),
        }
    }

    // ========================================
    // WRITE OPERATIONS
    // ========================================

    /// Record progress on a unit.
    ///
    /// Reads the current record (or the zero-record), merges the observation
    /// into it and writes it back with a conditional upsert. Returns the
    /// converged record as stored. Safe to retry blindly: repeating the
    /// call changes nothing and never grants XP twice.
    pub async fn record_progress(
        &self,
        learner: &LearnerId,
        unit: &UnitId,
        percentage: u32,
        completed: bool,
    ) -> Result<ProgressRecord, ProgressError> {
        self.record_progress_at(learner, unit, percentage, completed, self.clock.now())
            .await
    }

    /// [`record_progress`](Self::record_progress) for an observation made at
    /// `at`, e.g. a write replayed from the offline outbox. A completion
    /// keeps `at` as its completion time.
    pub async fn record_progress_at(
        &self,
        learner: &LearnerId,
        unit: &UnitId,
        percentage: u32,
        completed: bool,
        at: DateTime<Utc>,
    ) -> Result<ProgressRecord, ProgressError> {
        Self::check_learner(learner)?;
        let percentage = Self::check_percentage(percentage)?;
        self.check_unit(unit)?;

        let current = self
            .store
            .get_record(learner, unit)
            .await?
            .unwrap_or_else(|| ProgressRecord::zero(learner.clone(), unit.clone()));
        let incoming =
            ProgressRecord::observed(learner.clone(), unit.clone(), percentage, completed, at);
        let merged = merge(&current, &incoming);

        let stored = self.store.upsert_record(&merged).await.map_err(|e| {
            warn!(learner = %learner, unit = %unit, error = %e, "Progress write failed");
            e
        })?;

        debug!(
            learner = %learner,
            unit = %unit,
            percentage = stored.percentage,
            completed = stored.completed,
            "Recorded progress"
        );
        Ok(stored)
    }

    /// Record several observations. Different units are independent, so the
    /// writes run concurrently; results are in input order.
    pub async fn record_many(
        &self,
        learner: &LearnerId,
        updates: &[ProgressUpdate],
    ) -> Vec<Result<ProgressRecord, ProgressError>> {
        join_all(updates.iter().map(|u| {
            self.record_progress(learner, &u.unit_id, u.percentage, u.completed)
        }))
        .await
    }

    /// Explicitly restart a unit.
    ///
    /// The only sanctioned regression: the record is overwritten with the
    /// zero state instead of being merged. XP and rewards derived from the
    /// unit disappear until it is completed again.
    pub async fn reset_unit(
        &self,
        learner: &LearnerId,
        unit: &UnitId,
    ) -> Result<ProgressRecord, ProgressError> {
        Self::check_learner(learner)?;
        self.check_unit(unit)?;

        let reset = ProgressRecord::reset(learner.clone(), unit.clone(), self.clock.now());
        let stored = self.store.overwrite_record(&reset).await.map_err(|e| {
            warn!(learner = %learner, unit = %unit, error = %e, "Reset write failed");
            e
        })?;

        info!(learner = %learner, unit = %unit, "Unit reset");
        Ok(stored)
    }

    // ========================================
    // READ OPERATIONS
    // ========================================

    /// Current progress of one unit; the zero-record when nothing is stored
    pub async fn get_progress(
        &self,
        learner: &LearnerId,
        unit: &UnitId,
    ) -> Result<ProgressRecord, ProgressError> {
        Self::check_learner(learner)?;
        self.check_unit(unit)?;
        Ok(self
            .store
            .get_record(learner, unit)
            .await?
            .unwrap_or_else(|| ProgressRecord::zero(learner.clone(), unit.clone())))
    }

    /// Learner-wide gamification profile
    pub async fn get_profile(&self, learner: &LearnerId) -> Result<ProfileAggregate, ProgressError> {
        self.profile(learner, None).await
    }

    /// Profile whose percentage and completion count cover one scope
    pub async fn get_profile_for_scope(
        &self,
        learner: &LearnerId,
        scope: &ScopeId,
    ) -> Result<ProfileAggregate, ProgressError> {
        if self.catalog.scope(scope).is_none() {
            return Err(ProgressError::UnknownScope(scope.clone()));
        }
        self.profile(learner, Some(scope)).await
    }

    /// Completion of every chapter and track
    pub async fn scope_progress(
        &self,
        learner: &LearnerId,
    ) -> Result<Vec<ScopeProgress>, ProgressError> {
        Self::check_learner(learner)?;
        let records = self.store.get_all_records(learner).await?;
        Ok(derive_scope_progress(learner, &records, &self.catalog))
    }

    async fn profile(
        &self,
        learner: &LearnerId,
        scope: Option<&ScopeId>,
    ) -> Result<ProfileAggregate, ProgressError> {
        Self::check_learner(learner)?;
        let records = self.store.get_all_records(learner).await?;
        let profile = derive_profile(
            learner,
            &records,
            &self.catalog,
            scope,
            &self.settings,
            self.clock.now(),
        );

        debug!(
            learner = %learner,
            total_xp = profile.total_xp,
            level = profile.level,
            streak = profile.streak_days,
            rewards = profile.unlocked_rewards.len(),
            "Derived profile"
        );
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};

    const CATALOG: &str = r#"
[[unit]]
id = "perceptron"
xp_reward = 50

[[unit]]
id = "backprop"
xp_reward = 80
"#;

    fn engine() -> ProgressionEngine<MemoryStore, StaticCatalog> {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap());
        ProgressionEngine::new(
            MemoryStore::new(),
            StaticCatalog::from_toml_str(CATALOG).unwrap(),
            EngineSettings::default(),
        )
        .with_clock(Arc::new(clock))
    }

    #[tokio::test]
    async fn test_validation_happens_before_store_access() {
        let engine = engine();
        let learner = LearnerId::from("ana");

        let err = engine
            .record_progress(&learner, &"perceptron".into(), 101, false)
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::InvalidPercentage(101)));

        let err = engine
            .record_progress(&learner, &"transformers".into(), 10, false)
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::UnknownUnit(_)));

        let err = engine
            .record_progress(&"  ".into(), &"perceptron".into(), 10, false)
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::EmptyLearnerId));
        assert!(err.is_validation());

        assert!(engine.store().is_empty());
    }

    #[tokio::test]
    async fn test_get_progress_defaults_to_zero_record() {
        let engine = engine();
        let record = engine
            .get_progress(&"ana".into(), &"backprop".into())
            .await
            .unwrap();
        assert_eq!(record.percentage, 0);
        assert!(!record.completed);
    }

    #[tokio::test]
    async fn test_record_many_keeps_input_order() {
        let engine = engine();
        let updates = vec![
            ProgressUpdate {
                unit_id: "perceptron".into(),
                percentage: 100,
                completed: true,
            },
            ProgressUpdate {
                unit_id: "unknown".into(),
                percentage: 10,
                completed: false,
            },
            ProgressUpdate {
                unit_id: "backprop".into(),
                percentage: 30,
                completed: false,
            },
        ];

        let results = engine.record_many(&"ana".into(), &updates).await;
        assert!(results[0].as_ref().is_ok_and(|r| r.completed));
        assert!(matches!(results[1], Err(ProgressError::UnknownUnit(_))));
        assert!(results[2].as_ref().is_ok_and(|r| r.percentage == 30));
    }

    #[tokio::test]
    async fn test_unknown_scope_is_rejected() {
        let engine = engine();
        let err = engine
            .get_profile_for_scope(&"ana".into(), &"deep-learning".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ProgressError::UnknownScope(_)));
    }
}
