//! Local key-value persistence.
//!
//! Every piece of persisted state (the task list, the theme preference) is a
//! string value under a string key. Backends only need to implement
//! [`KeyValueStore`]; the callers own serialization.

pub mod file;
pub mod memory;
pub mod migrations;
pub mod sqlite;

use crate::shared::errors::StorageError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

/// Abstract local key-value store surviving across sessions.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, or `None` if nothing was stored.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Which backend the app persists to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Sqlite,
    Memory,
}

/// Opens the configured backend rooted at `storage_dir`.
pub fn open_backend(
    backend: StorageBackend,
    storage_dir: &Path,
) -> Result<Box<dyn KeyValueStore>, StorageError> {
    let store: Box<dyn KeyValueStore> = match backend {
        StorageBackend::File => Box::new(FileStorage::new(storage_dir.join("data"))),
        StorageBackend::Sqlite => Box::new(SqliteStorage::open(&storage_dir.join("taskpad.db"))?),
        StorageBackend::Memory => Box::new(MemoryStorage::new()),
    };

    tracing::info!(
        target: "storage",
        backend = ?backend,
        dir = %storage_dir.display(),
        "Storage backend opened"
    );

    Ok(store)
}
