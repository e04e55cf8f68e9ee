//! Global alert settings

use crate::storage::{load_record, save_record, Storage, StorageKey};
use serde::{Deserialize, Serialize};

/// Persisted global settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSettings {
    /// Master switch for evaluation and notification
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

impl AlertSettings {
    /// Load stored settings, enabled by default
    pub fn load(storage: &dyn Storage) -> Self {
        load_record(storage, StorageKey::Settings).unwrap_or_default()
    }

    /// Persist settings, logging on failure
    pub fn save(&self, storage: &dyn Storage) {
        save_record(storage, StorageKey::Settings, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_default_enabled() {
        let storage = MemoryStorage::new();
        assert!(AlertSettings::load(&storage).enabled);
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        AlertSettings { enabled: false }.save(&storage);
        assert!(!AlertSettings::load(&storage).enabled);
    }

    #[test]
    fn test_missing_field_defaults_enabled() {
        let storage = MemoryStorage::new();
        storage.save(StorageKey::Settings, "{}").unwrap();
        assert!(AlertSettings::load(&storage).enabled);
    }

    #[test]
    fn test_corrupt_settings_default_enabled() {
        let storage = MemoryStorage::new();
        storage.save(StorageKey::Settings, "enabled=false").unwrap();
        assert!(AlertSettings::load(&storage).enabled);
    }
}
