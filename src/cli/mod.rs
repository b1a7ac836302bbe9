//! CLI command implementations

pub mod catalog;
pub mod init;
pub mod profile;
pub mod record;

use std::path::Path;

use anyhow::Result;

use mlquest::config::Config;
use mlquest::{ProgressionEngine, SqliteStore, StaticCatalog};

pub type Engine = ProgressionEngine<SqliteStore, StaticCatalog>;

/// Load config and catalog, open the store
pub fn open_engine(config_path: Option<&Path>) -> Result<(Config, Engine)> {
    let config = Config::load(config_path)?;
    let catalog = config.load_catalog()?;
    let store = SqliteStore::open(&config.store_path())?;
    let engine = ProgressionEngine::new(store, catalog, config.engine.clone());
    Ok((config, engine))
}
