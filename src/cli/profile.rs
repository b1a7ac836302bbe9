//! Profile command implementation

use std::path::Path;

use anyhow::Result;

use mlquest::engine::LevelProgress;
use mlquest::{ContentCatalog, LearnerId, ScopeId};

use super::open_engine;

/// Show a learner's derived profile
pub async fn profile_command(
    config_path: Option<&Path>,
    learner: &str,
    scope: Option<&str>,
    json: bool,
) -> Result<()> {
    let (_, engine) = open_engine(config_path)?;
    let learner = LearnerId::from(learner);

    let profile = match scope {
        Some(scope) => {
            engine
                .get_profile_for_scope(&learner, &ScopeId::from(scope))
                .await?
        }
        None => engine.get_profile(&learner).await?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    let level = LevelProgress::new(profile.total_xp, engine.settings().xp_per_level);
    println!("{} - Level {} {}", profile.learner_id, profile.level, profile.title);
    println!(
        "  XP:        {} ({:.0}% to level {}, {} to go)",
        profile.total_xp,
        level.progress_to_next() * 100.0,
        profile.level + 1,
        profile.xp_to_next_level
    );
    println!(
        "  Streak:    {} day(s), best {}",
        profile.streak_days, profile.best_streak_days
    );
    if let Some(day) = profile.last_active_day {
        println!("  Last done: {}", day);
    }
    let over = profile
        .scope
        .as_ref()
        .map(|s| format!(" in {}", s))
        .unwrap_or_default();
    println!(
        "  Progress:  {:.1}%{}, {} completed, {} started",
        profile.overall_percentage, over, profile.units_completed, profile.units_started
    );

    if profile.unlocked_rewards.is_empty() {
        println!("  Rewards:   none yet");
    } else {
        println!("  Rewards:");
        for id in &profile.unlocked_rewards {
            let name = engine
                .catalog()
                .reward_rules()
                .iter()
                .find(|r| &r.id == id)
                .map(|r| r.name.as_str())
                .unwrap_or(id.as_str());
            println!("    - {}", name);
        }
    }

    if scope.is_none() {
        let scopes = engine.scope_progress(&learner).await?;
        let touched: Vec<_> = scopes.iter().filter(|s| s.percentage > 0.0).collect();
        if !touched.is_empty() {
            println!("  Chapters:");
            for s in touched {
                let title = if s.title.is_empty() { s.scope_id.as_str() } else { s.title.as_str() };
                println!(
                    "    {:<32} {:>3}/{:<3} {:>5.1}%",
                    title, s.units_completed, s.units_total, s.percentage
                );
            }
        }
    }

    Ok(())
}
