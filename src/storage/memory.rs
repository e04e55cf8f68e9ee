//! In-memory storage
//!
//! Session-only persistence, also the fake used throughout the test suite.

use super::{Storage, StorageKey};
use crate::error::StorageError;
use std::collections::HashMap;
use std::sync::RwLock;

/// Keeps records in a map for the lifetime of the value
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: RwLock<HashMap<StorageKey, String>>,
}

impl MemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw contents of a record, if any
    pub fn get(&self, key: StorageKey) -> Option<String> {
        self.records
            .read()
            .ok()
            .and_then(|records| records.get(&key).cloned())
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        let records = self.records.read().map_err(|e| StorageError::Read {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(records.get(&key).cloned())
    }

    fn save(&self, key: StorageKey, contents: &str) -> Result<(), StorageError> {
        let mut records = self.records.write().map_err(|e| StorageError::Write {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        records.insert(key, contents.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
