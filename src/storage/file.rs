use super::KeyValueStore;
use crate::shared::errors::StorageError;
use crate::shared::paths::ensure_dir;
use std::path::PathBuf;

/// Stores each key as `{dir}/{key}.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::invalid_key(key));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        Ok(Some(content))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        ensure_dir(&self.dir)?;
        std::fs::write(&path, value)?;
        tracing::trace!(
            target: "storage",
            path = %path.display(),
            bytes = value.len(),
            "Wrote key"
        );
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStorage::new(tmp.path().join("never-created"));
        assert_eq!(store.get("tasks").unwrap(), None);
    }

    #[test]
    fn test_set_creates_directory_and_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("data");
        let mut store = FileStorage::new(&dir);

        store.set("tasks", "[]").unwrap();

        assert!(dir.join("tasks.json").exists());
        assert_eq!(store.get("tasks").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_values_survive_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        {
            let mut store = FileStorage::new(tmp.path());
            store.set("darkMode", "true").unwrap();
        }
        let store = FileStorage::new(tmp.path());
        assert_eq!(store.get("darkMode").unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn test_remove() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileStorage::new(tmp.path());
        store.set("tasks", "[]").unwrap();
        store.remove("tasks").unwrap();
        store.remove("tasks").unwrap();
        assert_eq!(store.get("tasks").unwrap(), None);
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileStorage::new(tmp.path());

        for key in ["", "../tasks", "a/b", "dark mode"] {
            assert!(matches!(
                store.set(key, "x"),
                Err(StorageError::InvalidKey(_))
            ));
        }
    }

    #[test]
    fn test_write_failure_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        // A regular file where the directory should be
        let blocker = tmp.path().join("data");
        std::fs::write(&blocker, "not a dir").unwrap();

        let mut store = FileStorage::new(&blocker);
        assert!(matches!(store.set("tasks", "[]"), Err(StorageError::Io(_))));
    }
}
