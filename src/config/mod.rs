// src/config/mod.rs

//! Configuration loading, saving and validation.
//!
//! - `model.rs`: the TOML-backed data model (profiles, settings).
//! - `loader.rs`: read/write config files, defaults for missing fields.
//! - `validate.rs`: `RawConfigFile` -> `ConfigFile` checks.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, save_to_path};
pub use model::{
    BuiltInFilter, ConfigFile, ExportProfile, ImageProps, PathOptions, RawConfigFile,
    SettingsSection, SizeRule, TextFilter,
};
