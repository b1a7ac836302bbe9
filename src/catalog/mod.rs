//! Content catalog: learning units, the scope tree and reward rules
//!
//! The engine only needs a unit's id, XP reward and scope membership. The
//! catalog is read-only; [`StaticCatalog`] loads it from TOML and validates
//! the scope tree once so lookups never have to guard against cycles.

mod models;
mod static_catalog;

pub use models::{CatalogFile, LearningUnit, Scope, UnitKind};
pub use static_catalog::{CatalogError, StaticCatalog, BUILTIN_CATALOG};

use crate::progress::{ScopeId, UnitId};
use crate::rewards::RewardRule;

/// Read-only access to the content catalog
pub trait ContentCatalog: Send + Sync {
    /// Units in catalog order. With a scope, only units whose parent chain
    /// reaches that scope.
    fn list_units(&self, scope: Option<&ScopeId>) -> Vec<LearningUnit>;

    fn unit(&self, id: &UnitId) -> Option<&LearningUnit>;

    fn scope(&self, id: &ScopeId) -> Option<&Scope>;

    /// All scopes in catalog order
    fn scopes(&self) -> &[Scope];

    fn reward_rules(&self) -> &[RewardRule];
}
