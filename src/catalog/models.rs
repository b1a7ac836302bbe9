//! Catalog entities as seen by the progression engine

use serde::{Deserialize, Serialize};

use crate::progress::{RewardId, ScopeId, UnitId};
use crate::rewards::RewardRule;

/// What kind of content a unit is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    #[default]
    Lesson,
    Flashcards,
    Quiz,
}

impl UnitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lesson => "lesson",
            Self::Flashcards => "flashcards",
            Self::Quiz => "quiz",
        }
    }
}

/// Smallest trackable piece of content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningUnit {
    pub id: UnitId,
    #[serde(default)]
    pub title: String,
    /// Parent chapter or track
    #[serde(default, rename = "scope")]
    pub scope_id: Option<ScopeId>,
    pub xp_reward: u32,
    #[serde(default)]
    pub kind: UnitKind,
    /// Reward granted as soon as this unit is completed
    #[serde(default)]
    pub unlocks: Option<RewardId>,
}

/// A chapter or track. Scopes form a tree through `parent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub id: ScopeId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub parent: Option<ScopeId>,
}

/// On-disk catalog layout (TOML)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub scope: Vec<Scope>,
    #[serde(default)]
    pub unit: Vec<LearningUnit>,
    #[serde(default)]
    pub reward: Vec<RewardRule>,
}
