//! Settings file loader and serialization.
//!
//! Files ending in `.json` are read with serde_json, files ending in `.toml`
//! with toml. Any other extension is rejected.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::HarnessSettings;
use crate::error::ConfigError;

const SETTINGS_DIR: &str = ".config/two-phase-compare";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

/// Get the global settings path: ~/.config/two-phase-compare/settings.json
pub fn get_global_settings_path() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::ValidationFailed("Cannot determine home directory".to_string())
    })?;

    Ok(home.join(SETTINGS_DIR).join("settings.json"))
}

/// Validate a settings path and work out its format.
fn format_of(path: &Path) -> Result<Format, ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationFailed(
            "Configuration path cannot be empty".to_string(),
        ));
    }

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        Some(ext) => Err(ConfigError::ValidationFailed(format!(
            "Configuration file must have .json or .toml extension, got .{}",
            ext
        ))),
        None => Err(ConfigError::ValidationFailed(
            "Configuration file must have .json or .toml extension".to_string(),
        )),
    }
}

/// Load any settings struct from a JSON or TOML file.
pub fn load_from_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let format = format_of(path)?;

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound(path.display().to_string())
        } else {
            ConfigError::IoError(e)
        }
    })?;

    match format {
        Format::Json => Ok(serde_json::from_str(&content)?),
        Format::Toml => Ok(toml::from_str(&content)?),
    }
}

/// Save any settings struct to a JSON or TOML file.
pub fn save_to_file<T: Serialize>(value: &T, path: &Path) -> Result<(), ConfigError> {
    let format = format_of(path)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let content = match format {
        Format::Json => serde_json::to_string_pretty(value)?,
        Format::Toml => toml::to_string_pretty(value)?,
    };
    fs::write(path, content)?;
    Ok(())
}

/// Load harness settings from `path`, or from the global settings file when
/// no path is given. A missing global file yields the defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<HarnessSettings, ConfigError> {
    if let Some(path) = path {
        return load_from_file(path);
    }

    let global = get_global_settings_path()?;
    match load_from_file(&global) {
        Ok(settings) => Ok(settings),
        Err(ConfigError::FileNotFound(_)) => {
            log::debug!(
                "[Config] No settings at {}, using defaults",
                global.display()
            );
            Ok(HarnessSettings::default())
        }
        Err(e) => Err(e),
    }
}
