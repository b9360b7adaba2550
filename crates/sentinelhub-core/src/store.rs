//! Settings store implementations
//!
//! `MemoryStore` keeps values for the lifetime of the process. `FileStore` keeps a
//! flat TOML table of string values on disk and writes it through on every change.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{Result, ShError};
use crate::ports::SettingsStore;

/// In-memory settings store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.write().unwrap_or_else(PoisonError::into_inner).remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.values.read().unwrap_or_else(PoisonError::into_inner).keys().cloned().collect()
    }
}

/// Settings store persisted as a flat TOML table
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open a store at `path`. A missing file is an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let values = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| ShError::Store {
                reason: format!("Failed to read settings file {}: {}", path.display(), e),
            })?;
            toml::from_str(&content).map_err(|e| ShError::Store {
                reason: format!("Failed to parse settings file {}: {}", path.display(), e),
            })?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, values: RwLock::new(values) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string(values).map_err(|e| ShError::Store {
            reason: format!("Failed to serialize settings: {}", e),
        })?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl SettingsStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        self.flush(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        if values.remove(key).is_some() {
            self.flush(&values)?;
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.values.read().unwrap_or_else(PoisonError::into_inner).keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get("SentinelHub/crs"), None);

        store.set("SentinelHub/crs", "EPSG:4326").unwrap();
        assert_eq!(store.get("SentinelHub/crs").as_deref(), Some("EPSG:4326"));

        store.remove("SentinelHub/crs").unwrap();
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_memory_store_clones_share_values() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("a", "1").unwrap();
        assert_eq!(other.get("a").as_deref(), Some("1"));
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let store = FileStore::open(&path).unwrap();
        store.set("SentinelHub/instance_id", "abc").unwrap();
        store.set("proxy/proxyHost", "proxy.local").unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("SentinelHub/instance_id").as_deref(), Some("abc"));
        assert_eq!(reopened.get("proxy/proxyHost").as_deref(), Some("proxy.local"));
        assert_eq!(reopened.keys().len(), 2);
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "not = [valid").unwrap();

        assert!(matches!(FileStore::open(&path), Err(ShError::Store { .. })));
    }
}
