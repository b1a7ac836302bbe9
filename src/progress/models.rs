//! Identifiers and the per-(learner, unit) progress record

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Opaque learner identifier handed over by the identity provider.
    /// Never generated here.
    LearnerId
);
string_id!(
    /// Stable identifier of a lesson, flashcard deck or quiz
    UnitId
);
string_id!(
    /// Identifier of a chapter or track in the catalog's scope tree
    ScopeId
);
string_id!(
    /// Identifier of a badge or superpower
    RewardId
);

/// Durable progress of one learner on one unit.
///
/// There is exactly one logical record per `(learner_id, unit_id)`. It only
/// changes through [`merge`](super::merge) or an explicit reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub learner_id: LearnerId,
    pub unit_id: UnitId,
    /// 0..=100; always 100 when `completed`
    pub percentage: u8,
    pub completed: bool,
    /// Time of the first completion
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    /// The baseline used when nothing is stored for a key yet
    pub fn zero(learner_id: LearnerId, unit_id: UnitId) -> Self {
        Self {
            learner_id,
            unit_id,
            percentage: 0,
            completed: false,
            completed_at: None,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Candidate record for a reported observation.
    ///
    /// Normalizes completion: reaching 100% counts as completed, and a
    /// completed unit is always at 100%. The caller validates `percentage`.
    pub fn observed(
        learner_id: LearnerId,
        unit_id: UnitId,
        percentage: u8,
        completed: bool,
        at: DateTime<Utc>,
    ) -> Self {
        let at = truncate_millis(at);
        let completed = completed || percentage >= 100;
        Self {
            learner_id,
            unit_id,
            percentage: if completed { 100 } else { percentage },
            completed,
            completed_at: completed.then_some(at),
            updated_at: at,
        }
    }

    /// Record written by an explicit "redo this unit" request
    pub fn reset(learner_id: LearnerId, unit_id: UnitId, at: DateTime<Utc>) -> Self {
        Self {
            updated_at: truncate_millis(at),
            ..Self::zero(learner_id, unit_id)
        }
    }

    pub fn same_key(&self, other: &Self) -> bool {
        self.learner_id == other.learner_id && self.unit_id == other.unit_id
    }

    /// Check the record invariants; used when reading rows back from storage.
    pub fn validate(&self) -> Result<(), String> {
        if self.percentage > 100 {
            return Err(format!("percentage {} out of range", self.percentage));
        }
        if self.completed && self.percentage != 100 {
            return Err(format!(
                "completed record for {} has percentage {}",
                self.unit_id, self.percentage
            ));
        }
        if !self.completed && self.completed_at.is_some() {
            return Err(format!("incomplete record for {} has completed_at", self.unit_id));
        }
        Ok(())
    }
}

/// Drop sub-millisecond precision so records survive a round trip through
/// stores that keep epoch milliseconds.
pub fn truncate_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_observed_normalizes_completion() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();

        let full = ProgressRecord::observed("ana".into(), "linreg".into(), 100, false, at);
        assert!(full.completed);
        assert_eq!(full.completed_at, Some(at));

        let flagged = ProgressRecord::observed("ana".into(), "linreg".into(), 60, true, at);
        assert!(flagged.completed);
        assert_eq!(flagged.percentage, 100);

        let partial = ProgressRecord::observed("ana".into(), "linreg".into(), 40, false, at);
        assert!(!partial.completed);
        assert_eq!(partial.completed_at, None);
        assert_eq!(partial.percentage, 40);
    }

    #[test]
    fn test_zero_record_is_valid() {
        let zero = ProgressRecord::zero("ana".into(), "linreg".into());
        assert!(zero.validate().is_ok());
        assert_eq!(zero.updated_at, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_validate_rejects_inconsistent_rows() {
        let mut record = ProgressRecord::zero("ana".into(), "linreg".into());
        record.completed = true;
        record.percentage = 80;
        assert!(record.validate().is_err());
    }
}
