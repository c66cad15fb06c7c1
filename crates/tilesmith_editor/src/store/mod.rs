//! Asynchronous key-value stores
//!
//! The editor keeps the whole world under a single key, so a store only needs
//! `get`, `put` and `clear`. Values are JSON text.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use thiserror::Error;

/// Identity of a store: database name, schema version and collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub name: String,
    pub version: u32,
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "editor".to_string(),
            version: 1,
            collection: "world".to_string(),
        }
    }
}

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store is unavailable: {0}")]
    Unavailable(String),
    #[error("invalid key '{0}'")]
    InvalidKey(String),
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Asynchronous string key-value storage
#[allow(async_fn_in_trait)]
pub trait KeyValueStore {
    /// Read a value; `Ok(None)` when the key was never written
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Write a value, replacing any previous one atomically
    async fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Remove every key
    async fn clear(&mut self) -> Result<(), StoreError>;
}

/// Keys end up in file names, so only `[A-Za-z0-9_-]` is accepted
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.name, "editor");
        assert_eq!(config.version, 1);
        assert_eq!(config.collection, "world");
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("world").is_ok());
        assert!(validate_key("selected_map").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../world").is_err());
        assert!(validate_key("a/b").is_err());
    }
}
