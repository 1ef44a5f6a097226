// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::SchedulerSettings;
use crate::config::validate::validate;
use crate::errors::Result;

/// Load settings from a TOML file without semantic validation.
///
/// This only performs deserialization; use [`load_and_validate`] as the
/// entry point for the rest of the application.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<SchedulerSettings> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let settings: SchedulerSettings = toml::from_str(&contents)?;

    Ok(settings)
}

/// Load settings from a TOML file and run validation.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks the invariants serde cannot express (non-empty scheduler id,
///   distinct exchange names, positive channel capacity).
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<SchedulerSettings> {
    let settings = load_from_path(&path)?;
    validate(&settings)?;
    Ok(settings)
}
