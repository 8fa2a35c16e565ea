pub mod core;
pub mod shared;
pub mod storage;
pub mod tasks;

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::logging::{init_logging, LoggingGuards};
use crate::core::settings::{load_settings, AppSettings};
use crate::core::theme::Theme;
use crate::shared::errors::StorageError;
use crate::shared::outcome::Outcome;
use crate::shared::paths::{get_log_dir, get_storage_dir};
use crate::storage::{open_backend, KeyValueStore};
use crate::tasks::{ReorderCoordinator, TaskStore};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to open storage: {0}")]
    Storage(#[from] StorageError),
}

/// Everything the presentation layer needs, owned in one place.
pub struct AppContext {
    pub settings: AppSettings,
    pub storage_dir: PathBuf,
    pub tasks: TaskStore<Box<dyn KeyValueStore>>,
    pub reorder: ReorderCoordinator,
    pub theme: Theme,
    /// Non-fatal problems hit while loading persisted state.
    pub startup_warnings: Vec<StorageError>,
    _logging: Option<LoggingGuards>,
}

impl AppContext {
    /// Flips the theme and persists it next to the tasks.
    pub fn toggle_theme(&mut self) -> Outcome<Theme> {
        let outcome = self.theme.toggle(self.tasks.storage_mut());
        self.theme = outcome.value;
        outcome
    }
}

/// Initializes the app in the default data directory.
pub fn init() -> Result<AppContext, AppError> {
    init_in(&get_storage_dir())
}

/// Loads settings, starts logging, opens storage and loads tasks and theme
/// from `storage_dir`.
pub fn init_in(storage_dir: &Path) -> Result<AppContext, AppError> {
    let settings = load_settings(storage_dir);

    // Logging first, so the rest of setup is recorded
    let logging = match init_logging(&get_log_dir(storage_dir), &settings.log_filter) {
        Ok(guards) => Some(guards),
        Err(e) => {
            tracing::warn!(target: "system", "Logging not initialized: {}", e);
            None
        }
    };

    let storage = open_backend(settings.storage_backend, storage_dir)?;

    let mut startup_warnings = Vec::new();

    let loaded = TaskStore::load(storage);
    startup_warnings.extend(loaded.warning);
    let tasks = loaded.value;

    let loaded_theme = Theme::load(tasks.storage());
    startup_warnings.extend(loaded_theme.warning);
    let theme = loaded_theme.value;

    tracing::info!(
        target: "system",
        tasks = tasks.len(),
        theme = ?theme,
        dir = %storage_dir.display(),
        "App initialized"
    );

    Ok(AppContext {
        settings,
        storage_dir: storage_dir.to_path_buf(),
        tasks,
        reorder: ReorderCoordinator::new(),
        theme,
        startup_warnings,
        _logging: logging,
    })
}
