//! Settings resolution: server-wide display defaults merged with per-device
//! local overrides. Each field has its own override key, so a device can
//! override the clock size while still inheriting the server's font scale.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::models::settings::DisplaySettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    ClockSize,
    FontScale,
}

impl SettingsField {
    pub fn key(self) -> &'static str {
        match self {
            SettingsField::ClockSize => "display.clock_size",
            SettingsField::FontScale => "display.font_scale",
        }
    }
}

/// Device-local key/value store. Synchronous, single-device, never synced.
pub trait OverrideStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// A stored override, or None when the key is absent or unusable. Malformed
/// and non-positive values fall back to the server default rather than crash
/// the display.
pub fn override_value(store: &dyn OverrideStore, field: SettingsField) -> Option<f64> {
    store
        .get(field.key())?
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Resolve each field independently: local override if usable, else the
/// server default.
pub fn effective(server: DisplaySettings, store: &dyn OverrideStore) -> DisplaySettings {
    DisplaySettings {
        clock_size: override_value(store, SettingsField::ClockSize).unwrap_or(server.clock_size),
        font_scale: override_value(store, SettingsField::FontScale).unwrap_or(server.font_scale),
    }
}

pub fn set_override(store: &mut dyn OverrideStore, field: SettingsField, value: f64) {
    store.set(field.key(), &value.to_string());
}

pub fn clear_override(store: &mut dyn OverrideStore, field: SettingsField) {
    store.remove(field.key());
}

/// JSON-file-backed override store for the display client. Reads the whole
/// file once on open; every mutation is written back immediately.
#[derive(Debug)]
pub struct FileOverrideStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileOverrideStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(_) => BTreeMap::new(),
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("Could not create override dir {}: {}", parent.display(), e);
                return;
            }
        }
        match serde_json::to_string_pretty(&self.values) {
            Ok(raw) => {
                if let Err(e) = fs::write(&self.path, raw) {
                    warn!("Could not persist overrides to {}: {}", self.path.display(), e);
                }
            }
            Err(e) => warn!("Could not serialize overrides: {}", e),
        }
    }
}

impl OverrideStore for FileOverrideStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        self.persist();
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.persist();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MemoryStore(BTreeMap<String, String>);

    impl OverrideStore for MemoryStore {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).cloned()
        }
        fn set(&mut self, key: &str, value: &str) {
            self.0.insert(key.into(), value.into());
        }
        fn remove(&mut self, key: &str) {
            self.0.remove(key);
        }
    }

    fn server() -> DisplaySettings {
        DisplaySettings {
            clock_size: 16.0,
            font_scale: 1.0,
        }
    }

    #[test]
    fn defaults_apply_without_overrides() {
        let store = MemoryStore::default();
        assert_eq!(effective(server(), &store), server());
    }

    #[test]
    fn override_is_visible_immediately_and_clears_back() {
        let mut store = MemoryStore::default();
        set_override(&mut store, SettingsField::ClockSize, 20.0);
        assert_eq!(effective(server(), &store).clock_size, 20.0);

        clear_override(&mut store, SettingsField::ClockSize);
        assert_eq!(effective(server(), &store).clock_size, 16.0);
    }

    #[test]
    fn fields_override_independently() {
        let mut store = MemoryStore::default();
        set_override(&mut store, SettingsField::ClockSize, 12.0);

        // Server pushes a new font scale; the clock-size override is untouched
        // and the non-overridden field follows the server.
        let pushed = DisplaySettings {
            clock_size: 16.0,
            font_scale: 1.5,
        };
        let resolved = effective(pushed, &store);
        assert_eq!(resolved.clock_size, 12.0);
        assert_eq!(resolved.font_scale, 1.5);
    }

    #[test]
    fn malformed_or_nonpositive_values_fall_back() {
        let mut store = MemoryStore::default();
        store.set(SettingsField::ClockSize.key(), "not-a-number");
        store.set(SettingsField::FontScale.key(), "-2.0");
        assert_eq!(effective(server(), &store), server());

        store.set(SettingsField::FontScale.key(), "0");
        assert_eq!(effective(server(), &store).font_scale, 1.0);
    }

    #[test]
    fn file_store_round_trips_and_survives_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overrides.json");

        {
            let mut store = FileOverrideStore::open(&path);
            set_override(&mut store, SettingsField::FontScale, 1.25);
        }
        let store = FileOverrideStore::open(&path);
        assert_eq!(effective(server(), &store).font_scale, 1.25);

        std::fs::write(&path, "{{{ not json").unwrap();
        let store = FileOverrideStore::open(&path);
        assert_eq!(effective(server(), &store), server());
    }
}
