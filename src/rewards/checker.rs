//! Reward evaluation against a freshly derived profile

use std::collections::{BTreeSet, HashSet};

use super::definitions::{RewardRule, RewardTrigger};
use crate::catalog::ContentCatalog;
use crate::progress::{RewardId, UnitId};

/// Profile numbers a trigger may look at
pub struct RewardContext<'a> {
    pub total_xp: u64,
    pub level: u32,
    pub units_completed: usize,
    pub streak_days: u32,
    pub completed: &'a HashSet<UnitId>,
    pub catalog: &'a dyn ContentCatalog,
}

impl RewardContext<'_> {
    pub fn holds(&self, trigger: &RewardTrigger) -> bool {
        match trigger {
            RewardTrigger::TotalXpAtLeast { xp } => self.total_xp >= *xp,
            RewardTrigger::LevelAtLeast { level } => self.level >= *level,
            RewardTrigger::UnitsCompletedAtLeast { count } => self.units_completed >= *count,
            RewardTrigger::UnitCompleted { unit } => self.completed.contains(unit),
            RewardTrigger::ScopeCompleted { scope } => {
                let units = self.catalog.list_units(Some(scope));
                !units.is_empty() && units.iter().all(|u| self.completed.contains(&u.id))
            }
            RewardTrigger::StreakAtLeast { days } => self.streak_days >= *days,
            RewardTrigger::AllOf { triggers } => triggers.iter().all(|t| self.holds(t)),
            RewardTrigger::AnyOf { triggers } => triggers.iter().any(|t| self.holds(t)),
        }
    }
}

/// Ids of every rule whose trigger currently holds
pub fn evaluate_rules(rules: &[RewardRule], ctx: &RewardContext<'_>) -> BTreeSet<RewardId> {
    rules
        .iter()
        .filter(|rule| ctx.holds(&rule.trigger))
        .map(|rule| rule.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;

    const CATALOG: &str = r#"
[[scope]]
id = "trees"

[[unit]]
id = "decision-trees"
scope = "trees"
xp_reward = 40

[[unit]]
id = "random-forests"
scope = "trees"
xp_reward = 60

[[scope]]
id = "empty"

[[reward]]
id = "forester"
name = "Forester"
trigger = { kind = "scope_completed", scope = "trees" }

[[reward]]
id = "nothing"
name = "Nothing"
trigger = { kind = "scope_completed", scope = "empty" }

[[reward]]
id = "centurion"
name = "Centurion"
trigger = { kind = "total_xp_at_least", xp = 100 }
"#;

    fn ctx<'a>(
        catalog: &'a StaticCatalog,
        completed: &'a HashSet<UnitId>,
        total_xp: u64,
    ) -> RewardContext<'a> {
        RewardContext {
            total_xp,
            level: 1,
            units_completed: completed.len(),
            streak_days: 0,
            completed,
            catalog,
        }
    }

    #[test]
    fn test_scope_completed_requires_every_unit() {
        let catalog = StaticCatalog::from_toml_str(CATALOG).unwrap();

        let partial: HashSet<UnitId> = ["decision-trees".into()].into_iter().collect();
        let unlocked = evaluate_rules(catalog.reward_rules(), &ctx(&catalog, &partial, 40));
        assert!(unlocked.is_empty());

        let all: HashSet<UnitId> = ["decision-trees".into(), "random-forests".into()]
            .into_iter()
            .collect();
        let unlocked = evaluate_rules(catalog.reward_rules(), &ctx(&catalog, &all, 100));
        let ids: Vec<_> = unlocked.iter().map(|r| r.as_str()).collect();
        assert_eq!(ids, ["centurion", "forester"]);
    }

    #[test]
    fn test_nested_triggers() {
        let catalog = StaticCatalog::from_toml_str(CATALOG).unwrap();
        let completed = HashSet::new();
        let c = RewardContext {
            streak_days: 3,
            level: 2,
            ..ctx(&catalog, &completed, 150)
        };

        let both = RewardTrigger::AllOf {
            triggers: vec![
                RewardTrigger::StreakAtLeast { days: 3 },
                RewardTrigger::LevelAtLeast { level: 2 },
            ],
        };
        assert!(c.holds(&both));

        let either = RewardTrigger::AnyOf {
            triggers: vec![
                RewardTrigger::UnitsCompletedAtLeast { count: 1 },
                RewardTrigger::TotalXpAtLeast { xp: 151 },
            ],
        };
        assert!(!c.holds(&either));
        assert!(c.holds(&RewardTrigger::AllOf { triggers: vec![] }));
    }
}
