//! Daily streaks derived from completion timestamps
//!
//! A streak is a run of consecutive calendar days with at least one first
//! completion. The current streak must end today or yesterday, otherwise it
//! is 0.

use std::collections::BTreeSet;

use chrono::{Days, FixedOffset, NaiveDate};

use crate::progress::ProgressRecord;
use crate::time_bucket::day_of;

/// Streak numbers for one learner
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreakInfo {
    pub current: u32,
    pub best: u32,
    pub last_activity_day: Option<NaiveDate>,
}

impl StreakInfo {
    /// Derive streaks from a set of active days
    pub fn from_days(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> Self {
        // days after `today` come from skewed device clocks and do not count
        let past: Vec<NaiveDate> = days.range(..=today).copied().collect();
        let Some(&last) = past.last() else {
            return Self::default();
        };

        let mut best = 0u32;
        let mut run = 0u32;
        let mut prev: Option<NaiveDate> = None;
        for &day in &past {
            run = match prev {
                Some(p) if p.checked_add_days(Days::new(1)) == Some(day) => run + 1,
                _ => 1,
            };
            best = best.max(run);
            prev = Some(day);
        }

        let alive = today
            .checked_sub_days(Days::new(1))
            .is_some_and(|yesterday| last >= yesterday);

        Self {
            current: if alive { run } else { 0 },
            best,
            last_activity_day: Some(last),
        }
    }
}

/// Distinct calendar days on which the learner first completed something
pub fn completion_days<'a>(
    records: impl IntoIterator<Item = &'a ProgressRecord>,
    offset: FixedOffset,
) -> BTreeSet<NaiveDate> {
    records
        .into_iter()
        .filter(|r| r.completed)
        .filter_map(|r| r.completed_at)
        .map(|at| day_of(at, offset))
        .collect()
}
