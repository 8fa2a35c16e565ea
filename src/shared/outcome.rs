use crate::shared::errors::StorageError;

/// Result of a mutating call. The in-memory change always stands; `warning`
/// carries a persistence failure the caller may want to surface.
#[derive(Debug)]
#[must_use]
pub struct Outcome<T> {
    pub value: T,
    pub warning: Option<StorageError>,
}

impl<T> Outcome<T> {
    pub fn ok(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    pub fn with_warning(value: T, warning: Option<StorageError>) -> Self {
        Self { value, warning }
    }

    pub fn is_persisted(&self) -> bool {
        self.warning.is_none()
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            warning: self.warning,
        }
    }
}
