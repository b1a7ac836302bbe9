//! Profile derivation
//!
//! Every gamification number is a pure function of the learner's progress
//! records and the catalog. Nothing derived here is ever persisted.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::warn;

use super::levels::LevelProgress;
use super::streaks::{completion_days, StreakInfo};
use crate::catalog::{ContentCatalog, LearningUnit};
use crate::config::EngineSettings;
use crate::progress::{LearnerId, ProgressRecord, RewardId, ScopeId, UnitId};
use crate::rewards::{evaluate_rules, RewardContext};
use crate::time_bucket::{day_of, offset_from_minutes};

/// Derived gamification summary of one learner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileAggregate {
    pub learner_id: LearnerId,
    pub total_xp: u64,
    pub level: u32,
    pub title: String,
    pub xp_into_level: u64,
    pub xp_to_next_level: u64,
    pub streak_days: u32,
    pub best_streak_days: u32,
    pub last_active_day: Option<NaiveDate>,
    pub units_started: usize,
    pub units_completed: usize,
    /// Average percentage, 0.0 - 100.0
    pub overall_percentage: f64,
    /// Scope the percentage and completion count were computed for
    pub scope: Option<ScopeId>,
    pub unlocked_rewards: BTreeSet<RewardId>,
}

/// Completion of one chapter or track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeProgress {
    pub scope_id: ScopeId,
    pub title: String,
    pub units_total: usize,
    pub units_completed: usize,
    pub percentage: f64,
}

/// Derive the profile of `learner` from their records.
///
/// With a scope, `overall_percentage` and `units_completed` cover every unit
/// of that scope (missing records count as 0%); XP, level, streak and rewards
/// are always learner-wide.
pub fn derive_profile(
    learner: &LearnerId,
    records: &[ProgressRecord],
    catalog: &dyn ContentCatalog,
    scope: Option<&ScopeId>,
    settings: &EngineSettings,
    now: DateTime<Utc>,
) -> ProfileAggregate {
    let known = known_records(learner, records, catalog);

    let completed: HashSet<UnitId> = known
        .iter()
        .filter(|(r, _)| r.completed)
        .map(|(r, _)| r.unit_id.clone())
        .collect();

    let total_xp: u64 = known
        .iter()
        .filter(|(r, _)| r.completed)
        .map(|(_, unit)| u64::from(unit.xp_reward))
        .sum();
    let level = LevelProgress::new(total_xp, settings.xp_per_level);

    let offset = offset_from_minutes(settings.utc_offset_minutes);
    let days = completion_days(known.iter().map(|(r, _)| *r), offset);
    let streak = StreakInfo::from_days(&days, day_of(now, offset));

    let ctx = RewardContext {
        total_xp,
        level: level.level,
        units_completed: completed.len(),
        streak_days: streak.current,
        completed: &completed,
        catalog,
    };
    let unlocked_rewards = evaluate_rules(catalog.reward_rules(), &ctx);

    let (overall_percentage, units_completed) = match scope {
        None => (
            average(known.iter().map(|(r, _)| r.percentage)),
            completed.len(),
        ),
        Some(scope) => {
            let by_unit: HashMap<&UnitId, u8> = known
                .iter()
                .map(|(r, _)| (&r.unit_id, r.percentage))
                .collect();
            let units = catalog.list_units(Some(scope));
            (
                average(
                    units
                        .iter()
                        .map(|u| by_unit.get(&u.id).copied().unwrap_or(0)),
                ),
                units.iter().filter(|u| completed.contains(&u.id)).count(),
            )
        }
    };

    ProfileAggregate {
        learner_id: learner.clone(),
        total_xp,
        level: level.level,
        title: level.title.to_string(),
        xp_into_level: level.xp_into_level,
        xp_to_next_level: level.xp_to_next_level,
        streak_days: streak.current,
        best_streak_days: streak.best,
        last_active_day: streak.last_activity_day,
        units_started: known.iter().filter(|(r, _)| r.percentage > 0).count(),
        units_completed,
        overall_percentage,
        scope: scope.cloned(),
        unlocked_rewards,
    }
}

/// Per-scope completion for every scope in the catalog
pub fn derive_scope_progress(
    learner: &LearnerId,
    records: &[ProgressRecord],
    catalog: &dyn ContentCatalog,
) -> Vec<ScopeProgress> {
    let by_unit: HashMap<&UnitId, &ProgressRecord> = records
        .iter()
        .filter(|r| &r.learner_id == learner)
        .map(|r| (&r.unit_id, r))
        .collect();

    catalog
        .scopes()
        .iter()
        .map(|scope| {
            let units = catalog.list_units(Some(&scope.id));
            let rows: Vec<Option<&&ProgressRecord>> =
                units.iter().map(|u| by_unit.get(&u.id)).collect();
            ScopeProgress {
                scope_id: scope.id.clone(),
                title: scope.title.clone(),
                units_total: units.len(),
                units_completed: rows.iter().flatten().filter(|r| r.completed).count(),
                percentage: average(rows.iter().map(|r| r.map_or(0, |r| r.percentage))),
            }
        })
        .collect()
}

/// Records of this learner whose unit exists in the catalog
fn known_records<'a>(
    learner: &LearnerId,
    records: &'a [ProgressRecord],
    catalog: &'a dyn ContentCatalog,
) -> Vec<(&'a ProgressRecord, &'a LearningUnit)> {
    records
        .iter()
        .filter(|r| &r.learner_id == learner)
        .filter_map(|r| match catalog.unit(&r.unit_id) {
            Some(unit) => Some((r, unit)),
            None => {
                warn!(learner = %learner, unit = %r.unit_id, "Ignoring progress for unit missing from catalog");
                None
            }
        })
        .collect()
}

/// Mean of percentages; 0.0 for no values
fn average(values: impl Iterator<Item = u8>) -> f64 {
    let (sum, count) = values.fold((0u64, 0u64), |(s, c), v| (s + u64::from(v), c + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use chrono::TimeZone;

    const CATALOG: &str = r#"
[[scope]]
id = "supervised"
title = "Supervised Learning"

[[unit]]
id = "a"
scope = "supervised"
xp_reward = 50

[[unit]]
id = "b"
scope = "supervised"
xp_reward = 200

[[unit]]
id = "c"
xp_reward = 25

[[reward]]
id = "supervisor"
name = "Supervisor"
trigger = { kind = "scope_completed", scope = "supervised" }
"#;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 12, 18, 0, 0).unwrap()
    }

    fn record(unit: &str, pct: u8, done: bool, day: u32) -> ProgressRecord {
        let at = Utc.with_ymd_and_hms(2024, 9, day, 12, 0, 0).unwrap();
        ProgressRecord::observed("ana".into(), unit.into(), pct, done, at)
    }

    #[test]
    fn test_empty_profile() {
        let catalog = StaticCatalog::from_toml_str(CATALOG).unwrap();
        let profile = derive_profile(
            &"ana".into(),
            &[],
            &catalog,
            None,
            &EngineSettings::default(),
            now(),
        );

        assert_eq!(profile.total_xp, 0);
        assert_eq!(profile.level, 1);
        assert_eq!(profile.overall_percentage, 0.0);
        assert_eq!(profile.streak_days, 0);
        assert!(profile.unlocked_rewards.is_empty());
    }

    #[test]
    fn test_xp_counts_completed_units_only() {
        let catalog = StaticCatalog::from_toml_str(CATALOG).unwrap();
        let records = [record("a", 100, true, 11), record("b", 90, false, 12)];
        let profile = derive_profile(
            &"ana".into(),
            &records,
            &catalog,
            None,
            &EngineSettings::default(),
            now(),
        );

        assert_eq!(profile.total_xp, 50);
        assert_eq!(profile.units_completed, 1);
        assert_eq!(profile.units_started, 2);
        assert!((profile.overall_percentage - 95.0).abs() < f64::EPSILON);
        assert_eq!(profile.streak_days, 1);
    }

    #[test]
    fn test_scope_percentage_counts_untouched_units() {
        let catalog = StaticCatalog::from_toml_str(CATALOG).unwrap();
        let records = [record("a", 100, true, 12), record("c", 100, true, 12)];
        let profile = derive_profile(
            &"ana".into(),
            &records,
            &catalog,
            Some(&"supervised".into()),
            &EngineSettings::default(),
            now(),
        );

        assert!((profile.overall_percentage - 50.0).abs() < f64::EPSILON);
        assert_eq!(profile.units_completed, 1);
        assert_eq!(profile.total_xp, 75);
    }

    #[test]
    fn test_unknown_units_are_ignored() {
        let catalog = StaticCatalog::from_toml_str(CATALOG).unwrap();
        let records = [record("retired-lesson", 100, true, 12)];
        let profile = derive_profile(
            &"ana".into(),
            &records,
            &catalog,
            None,
            &EngineSettings::default(),
            now(),
        );
        assert_eq!(profile.total_xp, 0);
        assert_eq!(profile.units_completed, 0);
    }

    #[test]
    fn test_scope_reward_and_scope_progress() {
        let catalog = StaticCatalog::from_toml_str(CATALOG).unwrap();
        let records = [record("a", 100, true, 9), record("b", 100, true, 10)];
        let profile = derive_profile(
            &"ana".into(),
            &records,
            &catalog,
            None,
            &EngineSettings::default(),
            now(),
        );
        assert!(profile.unlocked_rewards.contains(&RewardId::from("supervisor")));
        assert_eq!(profile.level, 3);
        assert_eq!(profile.best_streak_days, 2);
        assert_eq!(profile.streak_days, 0);

        let scopes = derive_scope_progress(&"ana".into(), &records, &catalog);
        assert_eq!(scopes.len(), 1);
        assert_eq!(scopes[0].units_completed, 2);
        assert_eq!(scopes[0].units_total, 2);
        assert!((scopes[0].percentage - 100.0).abs() < f64::EPSILON);
    }
}
