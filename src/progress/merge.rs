//! Conflict resolution for concurrent writes to the same progress key
//!
//! `merge` is a lattice join over `(percentage, completed)`: commutative,
//! associative and idempotent. Replayed, duplicated or reordered writes from
//! any number of sessions converge to the same record.

use chrono::{DateTime, Utc};

use super::models::ProgressRecord;

/// Join two candidate states of the same `(learner, unit)` key.
///
/// - completion is monotonic
/// - percentage never regresses
/// - the earliest completion timestamp wins
/// - `updated_at` is the latest of both
pub fn merge(old: &ProgressRecord, incoming: &ProgressRecord) -> ProgressRecord {
    debug_assert!(old.same_key(incoming), "merging records of different keys");

    let completed = old.completed || incoming.completed;
    let completed_at = earliest(
        old.completed.then_some(old.completed_at).flatten(),
        incoming.completed.then_some(incoming.completed_at).flatten(),
    );

    ProgressRecord {
        learner_id: old.learner_id.clone(),
        unit_id: old.unit_id.clone(),
        percentage: if completed {
            100
        } else {
            old.percentage.max(incoming.percentage)
        },
        completed,
        completed_at,
        updated_at: old.updated_at.max(incoming.updated_at),
    }
}

fn earliest(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}
