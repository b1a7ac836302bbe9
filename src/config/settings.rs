//! Settings configuration types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::engine::XP_PER_LEVEL;

/// Progression rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// XP needed per level (level = xp / xp_per_level + 1)
    #[serde(default = "default_xp_per_level")]
    pub xp_per_level: u32,

    /// Offset from UTC, in minutes, that defines calendar days for streaks
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            xp_per_level: default_xp_per_level(),
            utc_offset_minutes: 0,
        }
    }
}

fn default_xp_per_level() -> u32 {
    XP_PER_LEVEL
}

/// Progress store location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// SQLite file; defaults to ~/.mlquest/progress.db
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Content catalog location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// TOML catalog; the built-in catalog is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Offline outbox location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// JSON outbox; defaults to ~/.mlquest/outbox.json
    #[serde(default)]
    pub outbox_path: Option<PathBuf>,
}
