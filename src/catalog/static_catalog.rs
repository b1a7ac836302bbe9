//! In-memory catalog loaded from a TOML file

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::debug;

use super::models::{CatalogFile, LearningUnit, Scope};
use super::ContentCatalog;
use crate::progress::{RewardId, ScopeId, UnitId};
use crate::rewards::{RewardCategory, RewardRule, RewardTrigger};

/// Catalog shipped with the binary
pub const BUILTIN_CATALOG: &str = include_str!("../../assets/catalog.toml");

/// Error type for catalog loading
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Duplicate unit id: {0}")]
    DuplicateUnit(UnitId),

    #[error("Duplicate scope id: {0}")]
    DuplicateScope(ScopeId),

    #[error("Duplicate reward id: {0}")]
    DuplicateReward(RewardId),

    #[error("{owner} references unknown scope {scope}")]
    UnknownScope { owner: String, scope: ScopeId },

    #[error("Reward {reward} references unknown unit {unit}")]
    UnknownUnit { reward: RewardId, unit: UnitId },

    #[error("Scope {0} is part of a cycle")]
    ScopeCycle(ScopeId),
}

/// Validated catalog held in memory
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    units: Vec<LearningUnit>,
    unit_index: HashMap<UnitId, usize>,
    scopes: Vec<Scope>,
    scope_index: HashMap<ScopeId, usize>,
    rules: Vec<RewardRule>,
}

impl StaticCatalog {
    /// The catalog embedded in the binary
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::new(file)
    }

    /// Build and validate a catalog
    pub fn new(file: CatalogFile) -> Result<Self, CatalogError> {
        let CatalogFile {
            scope: scopes,
            unit: units,
            reward: declared,
        } = file;

        let mut scope_index = HashMap::new();
        for (i, scope) in scopes.iter().enumerate() {
            if scope_index.insert(scope.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateScope(scope.id.clone()));
            }
        }
        for scope in &scopes {
            if let Some(parent) = &scope.parent
                && !scope_index.contains_key(parent)
            {
                return Err(CatalogError::UnknownScope {
                    owner: format!("Scope {}", scope.id),
                    scope: parent.clone(),
                });
            }
        }
        check_acyclic(&scopes, &scope_index)?;

        let mut unit_index = HashMap::new();
        for (i, unit) in units.iter().enumerate() {
            if unit_index.insert(unit.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateUnit(unit.id.clone()));
            }
            if let Some(scope) = &unit.scope_id
                && !scope_index.contains_key(scope)
            {
                return Err(CatalogError::UnknownScope {
                    owner: format!("Unit {}", unit.id),
                    scope: scope.clone(),
                });
            }
        }

        let rules = build_rules(declared, &units)?;
        for rule in &rules {
            for unit in rule.trigger.referenced_units() {
                if !unit_index.contains_key(unit) {
                    return Err(CatalogError::UnknownUnit {
                        reward: rule.id.clone(),
                        unit: unit.clone(),
                    });
                }
            }
            for scope in rule.trigger.referenced_scopes() {
                if !scope_index.contains_key(scope) {
                    return Err(CatalogError::UnknownScope {
                        owner: format!("Reward {}", rule.id),
                        scope: scope.clone(),
                    });
                }
            }
        }

        debug!(
            units = units.len(),
            scopes = scopes.len(),
            rewards = rules.len(),
            "Catalog loaded"
        );

        Ok(Self {
            units,
            unit_index,
            scopes,
            scope_index,
            rules,
        })
    }

    /// Whether `start` equals `scope` or descends from it
    fn is_within(&self, start: Option<&ScopeId>, scope: &ScopeId) -> bool {
        let mut current = start;
        while let Some(id) = current {
            if id == scope {
                return true;
            }
            current = self
                .scope_index
                .get(id)
                .and_then(|&i| self.scopes[i].parent.as_ref());
        }
        false
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl ContentCatalog for StaticCatalog {
    fn list_units(&self, scope: Option<&ScopeId>) -> Vec<LearningUnit> {
        match scope {
            None => self.units.clone(),
            Some(scope) => self
                .units
                .iter()
                .filter(|u| self.is_within(u.scope_id.as_ref(), scope))
                .cloned()
                .collect(),
        }
    }

    fn unit(&self, id: &UnitId) -> Option<&LearningUnit> {
        self.unit_index.get(id).map(|&i| &self.units[i])
    }

    fn scope(&self, id: &ScopeId) -> Option<&Scope> {
        self.scope_index.get(id).map(|&i| &self.scopes[i])
    }

    fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    fn reward_rules(&self) -> &[RewardRule] {
        &self.rules
    }
}

fn check_acyclic(
    scopes: &[Scope],
    index: &HashMap<ScopeId, usize>,
) -> Result<(), CatalogError> {
    for scope in scopes {
        let mut seen = HashSet::new();
        let mut current = Some(&scope.id);
        while let Some(id) = current {
            if !seen.insert(id) {
                return Err(CatalogError::ScopeCycle(scope.id.clone()));
            }
            current = index.get(id).and_then(|&i| scopes[i].parent.as_ref());
        }
    }
    Ok(())
}

/// Declared rules plus the implicit ones from `unit.unlocks`.
///
/// A unit unlocking a declared reward widens that reward's trigger; a unit
/// unlocking an undeclared id gets a superpower rule of its own.
fn build_rules(
    declared: Vec<RewardRule>,
    units: &[LearningUnit],
) -> Result<Vec<RewardRule>, CatalogError> {
    let mut rules: Vec<RewardRule> = Vec::with_capacity(declared.len());
    for rule in declared {
        if rules.iter().any(|r| r.id == rule.id) {
            return Err(CatalogError::DuplicateReward(rule.id));
        }
        rules.push(rule);
    }

    for unit in units {
        let Some(reward) = &unit.unlocks else {
            continue;
        };
        let by_unit = RewardTrigger::UnitCompleted {
            unit: unit.id.clone(),
        };
        match rules.iter_mut().find(|r| &r.id == reward) {
            Some(rule) => {
                let existing = std::mem::replace(
                    &mut rule.trigger,
                    RewardTrigger::AnyOf { triggers: Vec::new() },
                );
                rule.trigger = RewardTrigger::AnyOf {
                    triggers: vec![existing, by_unit],
                };
            }
            None => rules.push(RewardRule {
                id: reward.clone(),
                name: reward.to_string(),
                description: format!("Complete {}", unit_label(unit)),
                category: RewardCategory::Superpower,
                trigger: by_unit,
            }),
        }
    }

    Ok(rules)
}

fn unit_label(unit: &LearningUnit) -> &str {
    if unit.title.is_empty() {
        unit.id.as_str()
    } else {
        &unit.title
    }
}
