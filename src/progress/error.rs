//! Errors surfaced by progression operations

use super::models::{ScopeId, UnitId};
use crate::store::StoreError;

/// Error returned by [`ProgressionEngine`](crate::engine::ProgressionEngine) operations
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("Percentage {0} is outside 0..=100")]
    InvalidPercentage(u32),

    #[error("Unknown learning unit: {0}")]
    UnknownUnit(UnitId),

    #[error("Unknown scope: {0}")]
    UnknownScope(ScopeId),

    #[error("Learner id must not be empty")]
    EmptyLearnerId,

    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl ProgressError {
    /// Validation errors are rejected before touching the store
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Persistence(_))
    }

    /// Whether repeating the identical call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}
