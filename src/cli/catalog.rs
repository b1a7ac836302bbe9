//! Catalog listing commands

use std::path::Path;

use anyhow::{bail, Result};

use mlquest::config::Config;
use mlquest::rewards::RewardCategory;
use mlquest::{ContentCatalog, ScopeId};

/// List units, optionally restricted to a scope
pub fn units_command(config_path: Option<&Path>, scope: Option<&str>) -> Result<()> {
    let catalog = Config::load(config_path)?.load_catalog()?;
    let scope = scope.map(ScopeId::from);

    if let Some(scope) = &scope
        && catalog.scope(scope).is_none()
    {
        bail!("Unknown scope: {}", scope);
    }

    let units = catalog.list_units(scope.as_ref());
    if units.is_empty() {
        println!("No units found.");
        return Ok(());
    }

    println!("Units ({}):\n", units.len());
    for unit in units {
        let parent = unit
            .scope_id
            .as_ref()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<28} {:<10} {:>4} XP  [{}]",
            unit.id,
            unit.kind.as_str(),
            unit.xp_reward,
            parent
        );
        if !unit.title.is_empty() {
            println!("    {}", unit.title);
        }
    }

    Ok(())
}

/// List reward rules
pub fn rewards_command(config_path: Option<&Path>) -> Result<()> {
    let catalog = Config::load(config_path)?.load_catalog()?;
    let rules = catalog.reward_rules();

    if rules.is_empty() {
        println!("No rewards defined.");
        return Ok(());
    }

    for rule in rules {
        let tag = match rule.category {
            RewardCategory::Badge => "badge",
            RewardCategory::Superpower => "superpower",
        };
        println!("  {:<24} {:<11} {}", rule.id, tag, rule.name);
        if !rule.description.is_empty() {
            println!("    {}", rule.description);
        }
    }

    Ok(())
}
