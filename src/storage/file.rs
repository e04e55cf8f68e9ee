//! File-backed storage
//!
//! Each record is a JSON file in a data directory.

use super::{Storage, StorageKey};
use crate::error::StorageError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Stores records as `<data_dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a storage rooted at `dir` (created lazily on first save)
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Storage in the default data directory
    pub fn at_default_location() -> Self {
        Self::new(Self::default_dir())
    }

    /// Get default data directory
    pub fn default_dir() -> PathBuf {
        if let Some(data_dir) = dirs::data_dir() {
            data_dir.join("marketalert")
        } else {
            PathBuf::from(".marketalert")
        }
    }

    /// Directory holding the record files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing a record
    pub fn path_for(&self, key: StorageKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);

        match fs::read_to_string(&path) {
            Ok(contents) => {
                log::debug!("Loaded {} from {}", key, path.display());
                Ok(Some(contents))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Read {
                key: key.to_string(),
                message: format!("{}: {}", path.display(), e),
            }),
        }
    }

    fn save(&self, key: StorageKey, contents: &str) -> Result<(), StorageError> {
        let write_err = |e: io::Error| StorageError::Write {
            key: key.to_string(),
            message: e.to_string(),
        };

        fs::create_dir_all(&self.dir).map_err(write_err)?;

        // Write to a sibling temp file first so a crash never leaves a torn record
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, contents).map_err(write_err)?;
        fs::rename(&tmp, &path).map_err(write_err)?;

        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_for() {
        let storage = FileStorage::new("/tmp/marketalert-test");
        assert_eq!(
            storage.path_for(StorageKey::History),
            PathBuf::from("/tmp/marketalert-test/history.json")
        );
        assert_eq!(storage.dir(), Path::new("/tmp/marketalert-test"));
    }

    #[test]
    fn test_default_location() {
        let storage = FileStorage::at_default_location();
        assert_eq!(storage.dir(), FileStorage::default_dir().as_path());
    }

    #[test]
    fn test_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(storage.load(StorageKey::Rules).unwrap().is_none());
    }

    #[test]
    fn test_save_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("data");
        let storage = FileStorage::new(&nested);

        storage.save(StorageKey::Settings, "{\"enabled\":true}").unwrap();

        assert!(nested.join("settings.json").exists());
        assert!(!nested.join("settings.json.tmp").exists());
        assert_eq!(
            storage.load(StorageKey::Settings).unwrap().as_deref(),
            Some("{\"enabled\":true}")
        );
    }

    #[test]
    fn test_records_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        storage.save(StorageKey::Rules, "rules").unwrap();
        storage.save(StorageKey::History, "history").unwrap();

        assert_eq!(storage.load(StorageKey::Rules).unwrap().as_deref(), Some("rules"));
        assert_eq!(
            storage.load(StorageKey::History).unwrap().as_deref(),
            Some("history")
        );
        assert!(storage.load(StorageKey::Settings).unwrap().is_none());
    }
}
