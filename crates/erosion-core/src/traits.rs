//! Trait interfaces between the engine and its host.
//!
//! - [`KeyValueStore`] : string storage medium (erosion-store implements)
//! - [`Clock`] : paired wall/monotonic readings (erosion-engine implements)
//! - [`Clipboard`] : text copy mechanism (hosts implement)

use crate::error::{ClipboardError, StoreError};
use crate::types::Timestamp;

/// A string key/value medium such as `localStorage` or a directory of files.
///
/// Implementations may fail at any call (quota, sandboxing, I/O). Callers
/// that must never fail wrap the medium in a fallback store.
pub trait KeyValueStore {
    /// Read a value. `Ok(None)` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a value. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Source of [`Timestamp`]s.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// A text copy mechanism. Hosts provide a primary (async clipboard) and a
/// fallback (selection-based copy).
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}
