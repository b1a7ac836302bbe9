//! Progress records, identifiers and the merge policy
//!
//! A [`ProgressRecord`] is the single source of truth for everything the
//! engine derives. Records are only ever combined through [`merge`], so
//! derived XP cannot be granted twice for the same unit.

mod error;
mod merge;
mod models;

pub use error::ProgressError;
pub use merge::merge;
pub use models::{truncate_millis, LearnerId, ProgressRecord, RewardId, ScopeId, UnitId};
