//! Init command implementation

use anyhow::{bail, Result};

use mlquest::catalog::BUILTIN_CATALOG;
use mlquest::config::Config;

/// Write the default config plus an editable copy of the built-in catalog
pub fn init_command(force: bool) -> Result<()> {
    let config_path = Config::global_config_path();
    let catalog_path = Config::global_config_dir().join("catalog.toml");

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    let mut config = Config::default();
    config.catalog.path = Some(catalog_path.clone());
    config.save_to_file(&config_path)?;
    println!("Created: {}", config_path.display());

    if !catalog_path.exists() || force {
        std::fs::write(&catalog_path, BUILTIN_CATALOG)?;
        println!("Created: {}", catalog_path.display());
    }

    Ok(())
}
