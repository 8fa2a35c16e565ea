use crate::shared::outcome::Outcome;
use crate::storage::KeyValueStore;
use serde::Serialize;

/// Storage key for the display preference, stored as `"true"` / `"false"`.
pub const DARK_MODE_KEY: &str = "darkMode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Theme::Dark)
    }

    pub fn toggled(self) -> Self {
        Self::from_dark(!self.is_dark())
    }

    fn as_stored(self) -> &'static str {
        if self.is_dark() {
            "true"
        } else {
            "false"
        }
    }

    /// Reads the preference. Nothing stored, or anything other than `"true"`,
    /// means light; a read failure also falls back to light with a warning.
    pub fn load(storage: &dyn KeyValueStore) -> Outcome<Theme> {
        match storage.get(DARK_MODE_KEY) {
            Ok(value) => Outcome::ok(Theme::from_dark(value.as_deref() == Some("true"))),
            Err(e) => {
                tracing::warn!(target: "system", "Could not read theme preference: {}", e);
                Outcome::with_warning(Theme::default(), Some(e))
            }
        }
    }

    /// Persists the preference. The returned theme is the requested one even
    /// if the write failed.
    pub fn set(storage: &mut dyn KeyValueStore, dark: bool) -> Outcome<Theme> {
        let theme = Theme::from_dark(dark);
        let warning = storage.set(DARK_MODE_KEY, theme.as_stored()).err();
        if let Some(e) = &warning {
            tracing::warn!(target: "system", "Failed to save theme preference: {}", e);
        }
        tracing::debug!(target: "system", theme = ?theme, "Theme set");
        Outcome::with_warning(theme, warning)
    }

    /// Flips the theme and persists the result.
    pub fn toggle(self, storage: &mut dyn KeyValueStore) -> Outcome<Theme> {
        Theme::set(storage, self.toggled().is_dark())
    }
}
