//! In-process progress store

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{ProgressStore, StoreError};
use crate::progress::{merge, LearnerId, ProgressRecord, UnitId};

type Key = (LearnerId, UnitId);

/// `HashMap` store shared by clones; the join runs under the lock
#[derive(Clone, Default)]
pub struct MemoryStore {
    rows: Arc<Mutex<HashMap<Key, ProgressRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> std::sync::MutexGuard<'_, HashMap<Key, ProgressRecord>> {
        self.rows.lock().expect("Memory store lock poisoned")
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows().is_empty()
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn get_record(
        &self,
        learner: &LearnerId,
        unit: &UnitId,
    ) -> Result<Option<ProgressRecord>, StoreError> {
        Ok(self.rows().get(&(learner.clone(), unit.clone())).cloned())
    }

    async fn get_all_records(&self, learner: &LearnerId) -> Result<Vec<ProgressRecord>, StoreError> {
        let mut records: Vec<_> = self
            .rows()
            .values()
            .filter(|r| &r.learner_id == learner)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.unit_id.cmp(&b.unit_id));
        Ok(records)
    }

    async fn upsert_record(&self, record: &ProgressRecord) -> Result<ProgressRecord, StoreError> {
        let key = (record.learner_id.clone(), record.unit_id.clone());
        let mut rows = self.rows();
        let merged = match rows.get(&key) {
            Some(current) => merge(current, record),
            None => record.clone(),
        };
        rows.insert(key, merged.clone());
        Ok(merged)
    }

    async fn overwrite_record(
        &self,
        record: &ProgressRecord,
    ) -> Result<ProgressRecord, StoreError> {
        let key = (record.learner_id.clone(), record.unit_id.clone());
        self.rows().insert(key, record.clone());
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_upsert_joins_with_stored_row() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let high = ProgressRecord::observed("ana".into(), "svm".into(), 80, false, now);
        let stale = ProgressRecord::observed("ana".into(), "svm".into(), 30, false, now);

        store.upsert_record(&high).await.unwrap();
        let stored = store.upsert_record(&stale).await.unwrap();

        assert_eq!(stored.percentage, 80);
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get_record(&"ana".into(), &"svm".into()).await.unwrap(),
            Some(stored)
        );
    }

    #[tokio::test]
    async fn test_get_all_records_filters_by_learner() {
        let store = MemoryStore::new();
        let now = Utc::now();
        for (learner, unit) in [("ana", "svm"), ("ana", "pca"), ("ben", "svm")] {
            let r = ProgressRecord::observed(learner.into(), unit.into(), 10, false, now);
            store.upsert_record(&r).await.unwrap();
        }

        let records = store.get_all_records(&"ana".into()).await.unwrap();
        let units: Vec<_> = records.iter().map(|r| r.unit_id.as_str()).collect();
        assert_eq!(units, ["pca", "svm"]);
    }
}
