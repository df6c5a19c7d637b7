// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// Missing fields are filled from their serde defaults; no semantic
/// validation happens here. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    parse_str(&contents)
}

/// Parse TOML text into a `RawConfigFile`.
pub fn parse_str(contents: &str) -> Result<RawConfigFile> {
    let config: RawConfigFile = toml::from_str(contents)?;
    Ok(config)
}

/// Load a configuration file from path and validate it.
///
/// This is the recommended entry point for the rest of the application.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Persist a configuration, creating the parent folder when needed.
///
/// The written file always contains every field, so a later load sees the
/// same values even if defaults change.
pub fn save_to_path(path: impl AsRef<Path>, config: &ConfigFile) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let text = toml::to_string_pretty(&config.to_raw())?;
    fs::write(path, text)?;
    info!(path = ?path, profiles = config.profiles().len(), "saved config");
    Ok(())
}

/// Default config location: `VaultExport.toml` in the working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("VaultExport.toml")
}
