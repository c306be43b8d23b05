pub mod check;
pub mod run;

// Re-export command functions for convenience
pub use check::{check_wishlist, parse_table};
pub use run::run;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use yoyaku::config::Config;

const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Load configuration from `path` (or `./config.toml` when present),
/// apply environment overrides and validate
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(&path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            Config::from_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => Config::default(),
    };
    config.apply_env();
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
