use std::collections::HashMap;

use super::{validate_key, KeyValueStore, StoreError};

/// Store kept in process memory; used for ephemeral sessions and tests
#[derive(Debug, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    available: bool,
    put_count: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            available: true,
            put_count: 0,
        }
    }

    /// Store pre-filled with one value
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut store = Self::new();
        store.values.insert(key.into(), value.into());
        store
    }

    /// Number of successful `put` calls so far
    pub fn put_count(&self) -> usize {
        self.put_count
    }

    /// Make every operation fail while `false`
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Synchronous peek at a value
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.available {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store disabled".to_string()))
        }
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        validate_key(key)?;
        Ok(self.values.get(key).cloned())
    }

    async fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check()?;
        validate_key(key)?;
        self.values.insert(key.to_string(), value.to_string());
        self.put_count += 1;
        Ok(())
    }

    async fn clear(&mut self) -> Result<(), StoreError> {
        self.check()?;
        self.values.clear();
        Ok(())
    }
}
