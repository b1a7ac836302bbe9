//! mlquest - progression engine for a gamified machine-learning course
//!
//! Turns "learner finished unit X" events into durable, idempotent progress
//! records and derives the gamification state (XP, level, streak, completion
//! percentage, unlocked rewards) from them on every read.
//!
//! ## Guarantees
//!
//! 1. **One record per (learner, unit)**, only ever changed through a
//!    commutative, idempotent merge. Racing sessions converge and retries are
//!    always safe.
//!
//! 2. **Derived, never stored**: XP, level, streak and rewards are recomputed
//!    from the records, so a unit's XP is granted at most once no matter how
//!    often its completion is reported.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod progress;
pub mod rewards;
pub mod store;
pub mod sync;
pub mod time_bucket;

pub use catalog::{ContentCatalog, LearningUnit, StaticCatalog};
pub use engine::{ProfileAggregate, ProgressUpdate, ProgressionEngine};
pub use progress::{LearnerId, ProgressError, ProgressRecord, RewardId, ScopeId, UnitId};
pub use store::{MemoryStore, ProgressStore, SqliteStore, StoreError};
