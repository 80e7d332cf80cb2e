//! Store that degrades from a persistent medium to memory.
//!
//! The medium is chosen at construction: a primary store if the host has one,
//! otherwise memory from the start. The first fault from the primary (quota
//! exceeded, storage disabled, sandboxed context) switches the store to memory
//! for the rest of its life. None of this is visible to the caller.

use erosion_core::error::StoreError;
use erosion_core::traits::KeyValueStore;
use tracing::warn;

use crate::memory::MemoryStore;

/// Never-failing facade over an optional primary store.
pub struct FallbackStore {
    primary: Option<Box<dyn KeyValueStore>>,
    memory: MemoryStore,
}

impl FallbackStore {
    /// Use `primary` until it faults.
    pub fn new(primary: Box<dyn KeyValueStore>) -> Self {
        Self::with_memory(Some(primary), MemoryStore::new())
    }

    /// No persistent medium available.
    pub fn memory_only() -> Self {
        Self::with_memory(None, MemoryStore::new())
    }

    /// Explicit primary and fallback map (the map may be shared with other instances).
    pub fn with_memory(primary: Option<Box<dyn KeyValueStore>>, memory: MemoryStore) -> Self {
        Self { primary, memory }
    }

    /// Whether reads and writes now go to memory.
    pub fn is_degraded(&self) -> bool {
        self.primary.is_none()
    }

    /// Handle to the fallback map.
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn get(&mut self, key: &str) -> Option<String> {
        if let Some(primary) = self.primary.as_ref() {
            match primary.get(key) {
                Ok(value) => return value,
                Err(e) => self.degrade("get", key, &e),
            }
        }
        self.memory.read(key)
    }

    pub fn set(&mut self, key: &str, value: &str) {
        if let Some(primary) = self.primary.as_mut() {
            match primary.set(key, value) {
                Ok(()) => return,
                Err(e) => self.degrade("set", key, &e),
            }
        }
        self.memory.write(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        if let Some(primary) = self.primary.as_mut() {
            match primary.remove(key) {
                Ok(()) => return,
                Err(e) => self.degrade("remove", key, &e),
            }
        }
        self.memory.delete(key);
    }

    fn degrade(&mut self, op: &str, key: &str, err: &StoreError) {
        warn!(op, key, error = %err, "persistent storage failed; using in-memory state for this page");
        self.primary = None;
    }
}

impl std::fmt::Debug for FallbackStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackStore")
            .field("degraded", &self.is_degraded())
            .field("memory_keys", &self.memory.len())
            .finish()
    }
}
