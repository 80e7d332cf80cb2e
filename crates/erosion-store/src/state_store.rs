//! Load/save of [`EngineState`] keyed by artifact id.
//!
//! Neither operation can fail from the caller's side: storage faults degrade
//! the backing [`FallbackStore`], and unreadable payloads (malformed JSON,
//! other schema versions) read as absent so the caller starts from defaults.

use erosion_core::config::PersistenceConfig;
use erosion_core::error::StateDecodeError;
use erosion_core::types::EngineState;
use tracing::{debug, trace};

use crate::codec::{decode_state, encode_state};
use crate::fallback::FallbackStore;

/// Namespaced persistence for engine state.
#[derive(Debug)]
pub struct StateStore {
    backend: FallbackStore,
    persistence: PersistenceConfig,
    relief_cap: f64,
}

impl StateStore {
    pub fn new(backend: FallbackStore, persistence: PersistenceConfig, relief_cap: f64) -> Self {
        Self {
            backend,
            persistence,
            relief_cap,
        }
    }

    pub fn backend(&self) -> &FallbackStore {
        &self.backend
    }

    pub fn key_for(&self, artifact_id: &str) -> String {
        self.persistence.storage_key(artifact_id)
    }

    /// Stored state for `artifact_id`, or `None` if absent or unusable.
    pub fn load(&mut self, artifact_id: &str) -> Option<EngineState> {
        let key = self.key_for(artifact_id);
        let raw = self.backend.get(&key)?;
        match decode_state(&raw, self.relief_cap) {
            Ok(state) => Some(state),
            Err(StateDecodeError::SchemaMismatch { found, expected }) => {
                debug!(artifact = artifact_id, ?found, expected, "discarding state from another schema");
                None
            }
            Err(e) => {
                debug!(artifact = artifact_id, error = %e, "discarding unreadable state");
                None
            }
        }
    }

    /// Write the compacted state for `artifact_id`.
    pub fn save(&mut self, artifact_id: &str, state: &EngineState) {
        let key = self.key_for(artifact_id);
        let payload = encode_state(state);
        trace!(artifact = artifact_id, bytes = payload.len(), "persisting state");
        self.backend.set(&key, &payload);
    }
}
