//! Configuration file upgrades: add keys introduced after the file was
//! written, keeping the values the operator already set.

use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// Keys every config file is expected to carry, with their default values.
fn expected_keys() -> AppResult<Mapping> {
    let defaults = serde_yaml::to_value(super::Config::default())
        .map_err(|e| AppError::Config(e.to_string()))?;
    match defaults {
        Value::Mapping(m) => Ok(m),
        _ => Err(AppError::Config("default configuration is not a mapping".into())),
    }
}

/// Names of the expected keys absent from `content`.
pub fn missing_keys(content: &str) -> AppResult<Vec<String>> {
    let yaml: Value =
        serde_yaml::from_str(content).map_err(|e| AppError::Config(e.to_string()))?;
    let map = yaml
        .as_mapping()
        .ok_or_else(|| AppError::Config("configuration is not a mapping".into()))?;

    Ok(expected_keys()?
        .keys()
        .filter(|k| !map.contains_key(*k))
        .filter_map(|k| k.as_str().map(str::to_string))
        .collect())
}

/// Insert every missing key with its default value. Returns the added keys.
pub fn add_missing_keys(content: &str) -> AppResult<(String, Vec<String>)> {
    let mut yaml: Value =
        serde_yaml::from_str(content).map_err(|e| AppError::Config(e.to_string()))?;
    let map = yaml
        .as_mapping_mut()
        .ok_or_else(|| AppError::Config("configuration is not a mapping".into()))?;

    let mut added = Vec::new();
    for (key, value) in expected_keys()? {
        if !map.contains_key(&key) {
            if let Some(name) = key.as_str() {
                added.push(name.to_string());
            }
            map.insert(key, value);
        }
    }

    let serialized = serde_yaml::to_string(&yaml).map_err(|e| AppError::Config(e.to_string()))?;
    Ok((serialized, added))
}

/// Report missing keys of the config file at `path`.
pub fn check_config_file(path: &Path) -> AppResult<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
    missing_keys(&content)
}

/// Rewrite the config file at `path` with any missing keys added.
pub fn migrate_config_file(path: &Path) -> AppResult<()> {
    let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
    let (updated, added) = add_missing_keys(&content)?;

    if added.is_empty() {
        info("Configuration is up to date.");
        return Ok(());
    }

    fs::write(path, updated).map_err(|_| AppError::ConfigSave)?;
    success(format!(
        "Configuration migrated: added {}",
        added.join(", ")
    ));
    Ok(())
}
