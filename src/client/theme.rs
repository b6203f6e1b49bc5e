use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use super::{document::Document, ports::KeyValueStore, ClientError};

/// Key the theme preference is stored under
pub const THEME_KEY: &str = "theme";

/// Class applied to the document root in dark mode
pub const DARK_MODE_CLASS: &str = "dark-mode";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Reads a stored value; anything other than "dark", including nothing, is light
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark") => Theme::Dark,
            _ => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Light/dark switch persisted across sessions
pub struct ThemeToggle<K: KeyValueStore> {
    document: Document,
    store: K,
    control_id: String,
}

impl<K: KeyValueStore> ThemeToggle<K> {
    /// Applies the stored preference to the page
    pub fn init(document: Document, store: K, control_id: &str) -> Self {
        let toggle = Self {
            document,
            store,
            control_id: control_id.to_string(),
        };

        let theme = Theme::from_stored(toggle.store.get(THEME_KEY).as_deref());
        if theme == Theme::Dark {
            toggle.document.add_root_class(DARK_MODE_CLASS);
            toggle.document.set_checked(&toggle.control_id, true);
        }

        tracing::debug!(theme = theme.as_str(), "Theme initialized");

        toggle
    }

    /// Handles the control changing to `checked`
    ///
    /// Storage failures are logged; the page still switches theme.
    pub fn on_toggle(&self, checked: bool) {
        self.document.set_checked(&self.control_id, checked);

        let theme = if checked {
            self.document.add_root_class(DARK_MODE_CLASS);
            Theme::Dark
        } else {
            self.document.remove_root_class(DARK_MODE_CLASS);
            Theme::Light
        };

        if let Err(e) = self.store.set(THEME_KEY, theme.as_str()) {
            tracing::warn!(error = %e, "Failed to persist theme");
        }
    }

    pub fn current(&self) -> Theme {
        if self.document.root_has_class(DARK_MODE_CLASS) {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn store(&self) -> &K {
        &self.store
    }
}

/// Store that lives as long as the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a JSON file, rewritten on every set
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> HashMap<String, String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.read_all().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut values = self.read_all();
        values.insert(key.to_string(), value.to_string());

        let json =
            serde_json::to_string_pretty(&values).map_err(|e| ClientError::Storage(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| ClientError::Storage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ids;

    fn page() -> Document {
        Document::library_page()
    }

    #[test]
    fn test_from_stored() {
        assert_eq!(Theme::from_stored(Some("dark")), Theme::Dark);
        assert_eq!(Theme::from_stored(Some("light")), Theme::Light);
        assert_eq!(Theme::from_stored(Some("sepia")), Theme::Light);
        assert_eq!(Theme::from_stored(None), Theme::Light);
    }

    #[test]
    fn test_missing_key_means_light() {
        let document = page();
        let toggle = ThemeToggle::init(document.clone(), MemoryStore::new(), ids::THEME_TOGGLE);

        assert_eq!(toggle.current(), Theme::Light);
        assert!(!document.root_has_class(DARK_MODE_CLASS));
        assert!(!document.is_checked(ids::THEME_TOGGLE));
    }

    #[test]
    fn test_toggle_persists_each_change() {
        let document = page();
        let toggle = ThemeToggle::init(document.clone(), MemoryStore::new(), ids::THEME_TOGGLE);

        toggle.on_toggle(true);
        assert!(document.root_has_class(DARK_MODE_CLASS));
        assert_eq!(toggle.store().get(THEME_KEY).as_deref(), Some("dark"));

        toggle.on_toggle(false);
        assert!(!document.root_has_class(DARK_MODE_CLASS));
        assert_eq!(toggle.store().get(THEME_KEY).as_deref(), Some("light"));
    }

    #[test]
    fn test_dark_preference_survives_reload() {
        let store = MemoryStore::new();
        let first = ThemeToggle::init(page(), store, ids::THEME_TOGGLE);
        first.on_toggle(true);
        let ThemeToggle { store, .. } = first;

        let reloaded = page();
        let toggle = ThemeToggle::init(reloaded.clone(), store, ids::THEME_TOGGLE);

        assert_eq!(toggle.current(), Theme::Dark);
        assert!(reloaded.root_has_class(DARK_MODE_CLASS));
        assert!(reloaded.is_checked(ids::THEME_TOGGLE));
    }

    #[test]
    fn test_light_preference_survives_reload() {
        let path = std::env::temp_dir().join(format!("theme-{}.json", uuid::Uuid::new_v4()));
        let first = ThemeToggle::init(page(), FileStore::new(&path), ids::THEME_TOGGLE);
        first.on_toggle(true);
        first.on_toggle(false);

        let reloaded = page();
        let toggle = ThemeToggle::init(reloaded.clone(), FileStore::new(&path), ids::THEME_TOGGLE);

        assert_eq!(toggle.current(), Theme::Light);
        assert!(!reloaded.root_has_class(DARK_MODE_CLASS));
        assert!(!reloaded.is_checked(ids::THEME_TOGGLE));

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_file_store_round_trip() {
        let path = std::env::temp_dir().join(format!("theme-{}.json", uuid::Uuid::new_v4()));
        let store = FileStore::new(&path);

        assert_eq!(store.get(THEME_KEY), None);
        store.set(THEME_KEY, "dark").unwrap();
        assert_eq!(FileStore::new(&path).get(THEME_KEY).as_deref(), Some("dark"));

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_file_store_unwritable_path() {
        let store = FileStore::new("/nonexistent-dir/theme.json");
        assert!(matches!(
            store.set(THEME_KEY, "dark"),
            Err(ClientError::Storage(_))
        ));
    }
}
