//! Configuration loading with defaults

use std::path::Path;

use tracing::info;

use crate::errors::{MediateError, Result};
use crate::fs;
use crate::schemas::{Config, MIN_RESOLUTION_NOTES};

/// Load configuration from the store, falling back to defaults.
///
/// If config.json exists, it is read and missing fields take their defaults.
/// If it doesn't exist, the default configuration is returned.
pub fn load_config(root: &Path) -> Result<Config> {
    let config = fs::read_config(root)?;
    if config.min_resolution_notes < MIN_RESOLUTION_NOTES {
        return Err(MediateError::ConfigError(format!(
            "min_resolution_notes must be at least {} (got {})",
            MIN_RESOLUTION_NOTES, config.min_resolution_notes
        )));
    }
    Ok(config)
}

/// Create the `.mediate` directory with a default config.json.
///
/// An existing config is left alone unless `force` is set.
pub fn init_store(root: &Path, force: bool) -> Result<Config> {
    let config_path = fs::get_config_path(root);
    if config_path.exists() && !force {
        info!(path = %config_path.display(), "store already initialized");
        return load_config(root);
    }
    let config = Config::default();
    fs::write_json(&config_path, &config)?;
    info!(path = %config_path.display(), "initialized store");
    Ok(config)
}
