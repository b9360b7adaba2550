use crate::error::Result;

/// Port for a flat key-value settings store
pub trait SettingsStore: Send + Sync {
    /// Get a stored value
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a value if present
    fn remove(&self, key: &str) -> Result<()>;

    /// All stored keys
    fn keys(&self) -> Vec<String>;
}
