//! Store configuration.
//!
//! A [`StoreConfig`] can be built in code or loaded from a JSON file:
//!
//! ```json
//! {
//!   "path": "/var/lib/vigil",
//!   "create_if_missing": true,
//!   "sync_writes": false
//! }
//! ```
//!
//! Only `path` is required.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ArgumentError, Result, StorageError};

/// Settings for opening a [`Store`](crate::store::Store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database directory.
    pub path: PathBuf,

    /// Create the database and its column families if absent.
    #[serde(default = "default_create_if_missing")]
    pub create_if_missing: bool,

    /// Flush every write batch to disk before `save` returns.
    #[serde(default)]
    pub sync_writes: bool,
}

fn default_create_if_missing() -> bool {
    true
}

impl StoreConfig {
    /// Creates a configuration with defaults for the given directory.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            create_if_missing: default_create_if_missing(),
            sync_writes: false,
        }
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be read and
    /// [`ArgumentError::InvalidConfig`] if it is not a valid configuration.
    pub fn load<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let text = fs::read_to_string(file).map_err(|source| StorageError::ConfigRead {
            path: file.to_path_buf(),
            source,
        })?;

        let config: Self = serde_json::from_str(&text).map_err(|e| ArgumentError::InvalidConfig {
            reason: format!("{}: {e}", file.display()),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Sets whether every write batch is synced to disk.
    #[must_use]
    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    /// Sets whether a missing database is created.
    #[must_use]
    pub fn with_create_if_missing(mut self, create_if_missing: bool) -> Self {
        self.create_if_missing = create_if_missing;
        self
    }

    /// Checks the configuration for values that cannot work.
    ///
    /// # Errors
    ///
    /// Returns [`ArgumentError::InvalidConfig`] if `path` is empty.
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(ArgumentError::InvalidConfig {
                reason: "database path is empty".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::new("/tmp/vigil");
        assert!(config.create_if_missing);
        assert!(!config.sync_writes);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_path_is_invalid() {
        let err = StoreConfig::new("").validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_load_fills_defaults() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("vigil.json");
        fs::write(&file, r#"{ "path": "/data/vigil", "sync_writes": true }"#).unwrap();

        let config = StoreConfig::load(&file).unwrap();
        assert_eq!(config.path, PathBuf::from("/data/vigil"));
        assert!(config.create_if_missing);
        assert!(config.sync_writes);
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("vigil.json");
        fs::write(&file, "{ invalid json }").unwrap();

        let err = StoreConfig::load(&file).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = StoreConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
    }
}
