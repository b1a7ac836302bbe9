//! Shared test utilities for engine integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use mlquest::config::EngineSettings;
use mlquest::engine::FixedClock;
use mlquest::{
    LearnerId, MemoryStore, ProgressRecord, ProgressStore, ProgressionEngine, StaticCatalog,
    StoreError, UnitId,
};

/// Two chapters under one track, plus a 250 XP capstone for level checks
pub const CATALOG: &str = r#"
[[scope]]
id = "foundations"
title = "Foundations"

[[scope]]
id = "regression"
title = "Regression"
parent = "foundations"

[[scope]]
id = "clustering"
title = "Clustering"
parent = "foundations"

[[unit]]
id = "linear"
scope = "regression"
xp_reward = 50

[[unit]]
id = "loss"
scope = "regression"
xp_reward = 30

[[unit]]
id = "kmeans"
scope = "clustering"
xp_reward = 40
unlocks = "centroid-sense"

[[unit]]
id = "capstone"
xp_reward = 250

[[reward]]
id = "first-steps"
name = "First Steps"
trigger = { kind = "units_completed_at_least", count = 1 }

[[reward]]
id = "regression-master"
name = "Line Whisperer"
trigger = { kind = "scope_completed", scope = "regression" }

[[reward]]
id = "on-fire"
name = "On Fire"
trigger = { kind = "streak_at_least", days = 3 }
"#;

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 1, 9, 0, 0).unwrap()
}

pub fn catalog() -> StaticCatalog {
    StaticCatalog::from_toml_str(CATALOG).expect("test catalog is valid")
}

/// Engine over any store with a manually driven clock
pub fn engine_with<S: ProgressStore>(
    store: S,
) -> (ProgressionEngine<S, StaticCatalog>, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(start_time()));
    let engine = ProgressionEngine::new(store, catalog(), EngineSettings::default())
        .with_clock(clock.clone());
    (engine, clock)
}

pub fn memory_engine() -> (ProgressionEngine<MemoryStore, StaticCatalog>, Arc<FixedClock>) {
    engine_with(MemoryStore::new())
}

pub fn ana() -> LearnerId {
    LearnerId::from("ana")
}

/// Fails writes while the failure budget is non-zero.
/// `usize::MAX` means offline until [`FlakyStore::go_online`].
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    failures: Arc<AtomicUsize>,
}

impl FlakyStore {
    pub fn failing(times: usize) -> Self {
        let store = Self::default();
        store.failures.store(times, Ordering::SeqCst);
        store
    }

    pub fn go_offline(&self) {
        self.failures.store(usize::MAX, Ordering::SeqCst);
    }

    pub fn go_online(&self) {
        self.failures.store(0, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        let left = self.failures.load(Ordering::SeqCst);
        if left == 0 {
            return Ok(());
        }
        if left != usize::MAX {
            self.failures.store(left - 1, Ordering::SeqCst);
        }
        Err(StoreError::Unavailable("connection reset".to_string()))
    }
}

#[async_trait]
impl ProgressStore for FlakyStore {
    async fn get_record(
        &self,
        learner: &LearnerId,
        unit: &UnitId,
    ) -> Result<Option<ProgressRecord>, StoreError> {
        self.inner.get_record(learner, unit).await
    }

    async fn get_all_records(&self, learner: &LearnerId) -> Result<Vec<ProgressRecord>, StoreError> {
        self.inner.get_all_records(learner).await
    }

    async fn upsert_record(&self, record: &ProgressRecord) -> Result<ProgressRecord, StoreError> {
        self.check()?;
        self.inner.upsert_record(record).await
    }

    async fn overwrite_record(
        &self,
        record: &ProgressRecord,
    ) -> Result<ProgressRecord, StoreError> {
        self.check()?;
        self.inner.overwrite_record(record).await
    }
}

/// Point reads always miss, as if every session read before anyone wrote
#[derive(Clone, Default)]
pub struct StaleReadStore {
    pub inner: MemoryStore,
}

#[async_trait]
impl ProgressStore for StaleReadStore {
    async fn get_record(
        &self,
        _learner: &LearnerId,
        _unit: &UnitId,
    ) -> Result<Option<ProgressRecord>, StoreError> {
        Ok(None)
    }

    async fn get_all_records(&self, learner: &LearnerId) -> Result<Vec<ProgressRecord>, StoreError> {
        self.inner.get_all_records(learner).await
    }

    async fn upsert_record(&self, record: &ProgressRecord) -> Result<ProgressRecord, StoreError> {
        self.inner.upsert_record(record).await
    }

    async fn overwrite_record(
        &self,
        record: &ProgressRecord,
    ) -> Result<ProgressRecord, StoreError> {
        self.inner.overwrite_record(record).await
    }
}
