//! Persistence layer
//!
//! Alert state lives in three independent records (rules, history, settings).
//! Each record is stored and loaded on its own, so one corrupt record never
//! takes the others down with it.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// Identifies one persisted record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Rule table (built-in categories plus custom rules)
    Rules,
    /// Alert history, newest first
    History,
    /// Global alert settings
    Settings,
}

impl StorageKey {
    /// All record keys
    pub const ALL: [StorageKey; 3] = [Self::Rules, Self::History, Self::Settings];

    /// Record name, used as the file stem by [`FileStorage`]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rules => "rules",
            Self::History => "history",
            Self::Settings => "settings",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable key/value storage for serialized records
pub trait Storage: Send + Sync {
    /// Load the raw contents of a record, `None` if it was never written
    fn load(&self, key: StorageKey) -> Result<Option<String>, StorageError>;

    /// Replace the contents of a record
    fn save(&self, key: StorageKey, contents: &str) -> Result<(), StorageError>;

    /// Backend name for log messages
    fn name(&self) -> &str;
}

/// Load and decode a record, falling back to `None` on any failure.
///
/// Missing records are silent; unreadable or corrupt ones are logged.
pub fn load_record<T: DeserializeOwned>(storage: &dyn Storage, key: StorageKey) -> Option<T> {
    let contents = match storage.load(key) {
        Ok(Some(contents)) => contents,
        Ok(None) => {
            log::debug!("No stored {} in {}, using defaults", key, storage.name());
            return None;
        }
        Err(e) => {
            log::warn!("{}, using defaults", e);
            return None;
        }
    };

    match serde_json::from_str(&contents) {
        Ok(value) => Some(value),
        Err(e) => {
            let err = StorageError::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            };
            log::warn!("{}, using defaults", err);
            None
        }
    }
}

/// Encode and store a record.
///
/// Failures are logged and swallowed; the caller's in-memory state stays
/// authoritative for the rest of the session.
pub fn save_record<T: Serialize>(storage: &dyn Storage, key: StorageKey, value: &T) -> bool {
    let result = serde_json::to_string(value)
        .map_err(StorageError::from)
        .and_then(|contents| storage.save(key, &contents));

    match result {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Failed to persist {} to {}: {}", key, storage.name(), e);
            false
        }
    }
}
