//! Reward rule definitions
//!
//! Rules are declarative: a trigger is a predicate over the learner's derived
//! profile, so an unlocked reward can never exist without its trigger holding.

use serde::{Deserialize, Serialize};

use crate::progress::{RewardId, ScopeId, UnitId};

/// Reward category for grouping in UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardCategory {
    #[default]
    Badge,
    Superpower,
}

/// Condition under which a reward is unlocked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewardTrigger {
    TotalXpAtLeast { xp: u64 },
    LevelAtLeast { level: u32 },
    UnitsCompletedAtLeast { count: usize },
    UnitCompleted { unit: UnitId },
    /// Every unit in the scope (and its sub-scopes) completed; never holds
    /// for an empty scope
    ScopeCompleted { scope: ScopeId },
    StreakAtLeast { days: u32 },
    AllOf { triggers: Vec<RewardTrigger> },
    AnyOf { triggers: Vec<RewardTrigger> },
}

impl RewardTrigger {
    /// Units named anywhere in this trigger
    pub fn referenced_units(&self) -> Vec<&UnitId> {
        let mut out = Vec::new();
        self.visit(&mut |t| {
            if let Self::UnitCompleted { unit } = t {
                out.push(unit);
            }
        });
        out
    }

    /// Scopes named anywhere in this trigger
    pub fn referenced_scopes(&self) -> Vec<&ScopeId> {
        let mut out = Vec::new();
        self.visit(&mut |t| {
            if let Self::ScopeCompleted { scope } = t {
                out.push(scope);
            }
        });
        out
    }

    fn visit<'a>(&'a self, f: &mut impl FnMut(&'a Self)) {
        f(self);
        if let Self::AllOf { triggers } | Self::AnyOf { triggers } = self {
            for t in triggers {
                t.visit(f);
            }
        }
    }
}

/// A badge or superpower and the trigger that unlocks it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardRule {
    pub id: RewardId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: RewardCategory,
    pub trigger: RewardTrigger,
}
