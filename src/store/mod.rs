//! Progress store adapters
//!
//! The engine depends only on [`ProgressStore`]. Stores need no locking or
//! transactions across calls: `upsert_record` joins the incoming record with
//! whatever the store currently holds, so racing writers converge.
//!
//! ```text
//!  web session ──┐                     ┌── MemoryStore   (tests, ephemeral)
//!                ├─► ProgressStore ────┤
//!  mobile session┘                     └── SqliteStore   (~/.mlquest/progress.db)
//! ```

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;

use crate::progress::{LearnerId, ProgressRecord, UnitId};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Corrupt progress row: {0}")]
    Corrupt(String),
}

/// Durable key-value table keyed by `(learner, unit)`
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Point read; `None` means the zero-record
    async fn get_record(
        &self,
        learner: &LearnerId,
        unit: &UnitId,
    ) -> Result<Option<ProgressRecord>, StoreError>;

    /// Every record of one learner
    async fn get_all_records(&self, learner: &LearnerId) -> Result<Vec<ProgressRecord>, StoreError>;

    /// Conditional insert-or-update. The store joins `record` with its
    /// current row via [`merge`](crate::progress::merge) and returns the
    /// converged row.
    async fn upsert_record(&self, record: &ProgressRecord) -> Result<ProgressRecord, StoreError>;

    /// Unconditional write, reserved for explicit resets
    async fn overwrite_record(&self, record: &ProgressRecord)
    -> Result<ProgressRecord, StoreError>;
}
