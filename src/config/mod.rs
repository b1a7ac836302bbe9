//! Configuration loading and management

mod io;
mod settings;

pub use settings::{CatalogSettings, EngineSettings, StoreSettings, SyncSettings};
pub(crate) use io::write_atomic;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::StaticCatalog;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Progression rules
    #[serde(default)]
    pub engine: EngineSettings,

    /// Progress store
    #[serde(default)]
    pub store: StoreSettings,

    /// Content catalog
    #[serde(default)]
    pub catalog: CatalogSettings,

    /// Offline outbox
    #[serde(default)]
    pub sync: SyncSettings,
}

impl Config {
    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.engine.xp_per_level == 0 {
            bail!("engine.xp_per_level must be at least 1");
        }
        if self.engine.utc_offset_minutes.abs() >= 24 * 60 {
            bail!(
                "engine.utc_offset_minutes must be within ±1439, got {}",
                self.engine.utc_offset_minutes
            );
        }
        Ok(())
    }

    /// Resolved progress database path
    pub fn store_path(&self) -> PathBuf {
        self.store
            .path
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("progress.db"))
    }

    /// Resolved outbox path
    pub fn outbox_path(&self) -> PathBuf {
        self.sync
            .outbox_path
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("outbox.json"))
    }

    /// Load the configured catalog, or the built-in one
    pub fn load_catalog(&self) -> Result<StaticCatalog> {
        let catalog = match &self.catalog.path {
            Some(path) => StaticCatalog::from_file(path)
                .with_context(|| format!("Failed to load catalog: {}", path.display()))?,
            None => StaticCatalog::builtin().context("Built-in catalog is invalid")?,
        };
        Ok(catalog)
    }
}
