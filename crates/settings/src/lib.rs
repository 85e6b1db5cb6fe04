//! Persisted viewer preferences.
//!
//! One durable value today: the theme. Stored behind a small trait so the
//! app injects either browser `localStorage` or an in-memory fallback, and
//! tests never need a browser.

/// localStorage key for the theme preference.
pub const THEME_STORAGE_KEY: &str = "framescope.dark_mode";

/// Light/dark preference.
///
/// Persisted with the legacy values `"enabled"` (dark) and `"disabled"`
/// (light); anything else in storage is treated as unset.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum ThemePreference {
    Dark,
    #[default]
    Light,
}

impl ThemePreference {
    pub fn as_stored_str(self) -> &'static str {
        match self {
            ThemePreference::Dark => "enabled",
            ThemePreference::Light => "disabled",
        }
    }

    pub fn from_stored_str(raw: &str) -> Option<Self> {
        match raw.trim() {
            "enabled" => Some(ThemePreference::Dark),
            "disabled" => Some(ThemePreference::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemePreference::Dark => ThemePreference::Light,
            ThemePreference::Light => ThemePreference::Dark,
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, ThemePreference::Dark)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    StorageUnavailable,
    Io(String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::StorageUnavailable => write!(f, "browser storage unavailable"),
            SettingsError::Io(msg) => write!(f, "settings storage error: {msg}"),
        }
    }
}

impl std::error::Error for SettingsError {}

pub trait SettingsStore {
    /// `Ok(None)` means "nothing stored yet"; callers fall back to the default.
    fn load_theme(&self) -> Result<Option<ThemePreference>, SettingsError>;
    fn save_theme(&mut self, theme: ThemePreference) -> Result<(), SettingsError>;
}

#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    theme: Option<ThemePreference>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn load_theme(&self) -> Result<Option<ThemePreference>, SettingsError> {
        Ok(self.theme)
    }

    fn save_theme(&mut self, theme: ThemePreference) -> Result<(), SettingsError> {
        self.theme = Some(theme);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm_storage {
    use super::{SettingsError, SettingsStore, ThemePreference};

    #[derive(Debug)]
    pub struct LocalStorageSettingsStore {
        key: String,
    }

    impl LocalStorageSettingsStore {
        pub fn new(key: impl Into<String>) -> Result<Self, SettingsError> {
            let store = Self { key: key.into() };
            // Probe storage now so callers can fall back to memory at startup.
            window_local_storage()?;
            Ok(store)
        }
    }

    impl SettingsStore for LocalStorageSettingsStore {
        fn load_theme(&self) -> Result<Option<ThemePreference>, SettingsError> {
            let storage = window_local_storage()?;
            let raw = storage
                .get_item(&self.key)
                .map_err(|e| SettingsError::Io(format!("get_item failed: {:?}", e)))?;
            Ok(raw.as_deref().and_then(ThemePreference::from_stored_str))
        }

        fn save_theme(&mut self, theme: ThemePreference) -> Result<(), SettingsError> {
            let storage = window_local_storage()?;
            storage
                .set_item(&self.key, theme.as_stored_str())
                .map_err(|e| SettingsError::Io(format!("set_item failed: {:?}", e)))
        }
    }

    fn window_local_storage() -> Result<web_sys::Storage, SettingsError> {
        let win = web_sys::window().ok_or(SettingsError::StorageUnavailable)?;
        win.local_storage()
            .map_err(|e| SettingsError::Io(format!("localStorage error: {:?}", e)))?
            .ok_or(SettingsError::StorageUnavailable)
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_storage::LocalStorageSettingsStore;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct LocalStorageSettingsStore;

#[cfg(not(target_arch = "wasm32"))]
impl LocalStorageSettingsStore {
    pub fn new(_key: impl Into<String>) -> Result<Self, SettingsError> {
        Err(SettingsError::StorageUnavailable)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl SettingsStore for LocalStorageSettingsStore {
    fn load_theme(&self) -> Result<Option<ThemePreference>, SettingsError> {
        Err(SettingsError::StorageUnavailable)
    }

    fn save_theme(&mut self, _theme: ThemePreference) -> Result<(), SettingsError> {
        Err(SettingsError::StorageUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemorySettingsStore, SettingsStore, ThemePreference};
    use pretty_assertions::assert_eq;

    #[test]
    fn stored_strings_round_trip() {
        for theme in [ThemePreference::Dark, ThemePreference::Light] {
            assert_eq!(
                ThemePreference::from_stored_str(theme.as_stored_str()),
                Some(theme)
            );
        }
    }

    #[test]
    fn unknown_stored_value_is_unset() {
        assert_eq!(ThemePreference::from_stored_str("on"), None);
        assert_eq!(ThemePreference::from_stored_str(""), None);
        assert_eq!(
            ThemePreference::from_stored_str(" enabled "),
            Some(ThemePreference::Dark)
        );
    }

    #[test]
    fn toggled_flips_and_returns() {
        assert_eq!(ThemePreference::Dark.toggled(), ThemePreference::Light);
        assert_eq!(ThemePreference::Light.toggled().toggled(), ThemePreference::Light);
    }

    #[test]
    fn in_memory_store_round_trips() {
        let mut store = InMemorySettingsStore::new();
        assert_eq!(store.load_theme().unwrap(), None);
        store.save_theme(ThemePreference::Dark).unwrap();
        assert_eq!(store.load_theme().unwrap(), Some(ThemePreference::Dark));
        store.save_theme(ThemePreference::Light).unwrap();
        assert_eq!(store.load_theme().unwrap(), Some(ThemePreference::Light));
    }
}
