use std::path::{Path, PathBuf};

pub const APP_DIR_NAME: &str = "taskpad";

/// Environment variable that overrides the data directory entirely.
pub const DATA_DIR_ENV: &str = "TASKPAD_DATA_DIR";

/// Get the base storage directory following XDG Base Directory Specification.
/// Returns `$TASKPAD_DATA_DIR`, `$XDG_DATA_HOME/taskpad`, the platform data
/// directory, or `./.taskpad` as a last resort.
pub fn get_storage_dir() -> PathBuf {
    resolve_storage_dir(
        std::env::var_os(DATA_DIR_ENV).map(PathBuf::from),
        std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
        dirs::data_dir(),
    )
}

fn resolve_storage_dir(
    explicit: Option<PathBuf>,
    xdg_data: Option<PathBuf>,
    platform_data: Option<PathBuf>,
) -> PathBuf {
    if let Some(dir) = explicit.filter(|p| !p.as_os_str().is_empty()) {
        return dir;
    }

    if let Some(xdg_data) = xdg_data.filter(|p| !p.as_os_str().is_empty()) {
        return xdg_data.join(APP_DIR_NAME);
    }

    match platform_data {
        Some(data) => data.join(APP_DIR_NAME),
        None => PathBuf::from(".").join(format!(".{}", APP_DIR_NAME)),
    }
}

/// Get the logs directory path.
/// Returns `{storage_dir}/logs`.
pub fn get_log_dir(storage_dir: &Path) -> PathBuf {
    storage_dir.join("logs")
}

/// Get the settings file path.
/// Returns `{storage_dir}/settings.json`.
pub fn get_settings_path(storage_dir: &Path) -> PathBuf {
    storage_dir.join("settings.json")
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
