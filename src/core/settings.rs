use crate::shared::paths::{ensure_dir, get_settings_path};
use crate::storage::StorageBackend;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Application settings, read from `settings.json` in the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub storage_backend: StorageBackend,
    /// `tracing-subscriber` filter directive, used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::default(),
            log_filter: "info".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Loads settings, falling back to defaults when the file is missing or
/// unreadable.
pub fn load_settings(storage_dir: &Path) -> AppSettings {
    let path = get_settings_path(storage_dir);

    if !path.exists() {
        return AppSettings::default();
    }

    match load_settings_from_file(&path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(target: "system", "Ignoring settings at {:?}: {}", path, e);
            AppSettings::default()
        }
    }
}

fn load_settings_from_file(path: &Path) -> Result<AppSettings, SettingsError> {
    let contents = std::fs::read_to_string(path)?;
    let settings = serde_json::from_str(&contents)?;
    Ok(settings)
}

pub fn save_settings(storage_dir: &Path, settings: &AppSettings) -> Result<(), SettingsError> {
    ensure_dir(storage_dir)?;

    let path = get_settings_path(storage_dir);
    let contents = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, contents)?;
    Ok(())
}
