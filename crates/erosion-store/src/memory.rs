//! In-process key/value store.
//!
//! Clones share the same map, so a second engine instance in the same process
//! (a simulated reload) sees what the first one wrote.

use std::collections::HashMap;
use std::sync::Arc;

use erosion_core::error::StoreError;
use erosion_core::traits::KeyValueStore;
use parking_lot::Mutex;

/// Shared in-memory map. Never fails.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Infallible read.
    pub fn read(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    /// Infallible write.
    pub fn write(&self, key: &str, value: &str) {
        self.entries.lock().insert(key.to_string(), value.to_string());
    }

    /// Infallible removal.
    pub fn delete(&self, key: &str) {
        self.entries.lock().remove(key);
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.write(key, value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.delete(key);
        Ok(())
    }
}
