//! Shared builders for the integration suites.

use erosion_core::config::EngineConfig;
use erosion_core::error::StoreError;
use erosion_core::traits::KeyValueStore;
use erosion_core::types::{PointerKind, TargetId, Timestamp};
use erosion_engine::binding::RevealBinding;
use erosion_engine::{ArtifactBinding, ErosionEngine, InteractionEvent, ObservationMode};
use erosion_store::{FallbackStore, MemoryStore};

/// Artifact id used across suites.
pub const ARTIFACT: &str = "artifact123abc";

/// Wall-clock origin for test timestamps (2023-11-14).
pub const WALL_ORIGIN_MS: f64 = 1_700_000_000_000.0;

/// Timestamp `ms` into a session that began at [`WALL_ORIGIN_MS`].
pub fn at(ms: f64) -> Timestamp {
    Timestamp::new(WALL_ORIGIN_MS + ms, ms)
}

/// Storage key the engine uses for [`ARTIFACT`] under the default namespace.
pub fn storage_key() -> String {
    EngineConfig::default().persistence.storage_key(ARTIFACT)
}

/// Binding with `fragments` fragments and one reveal target.
pub fn binding(fragments: u32) -> ArtifactBinding {
    ArtifactBinding {
        reveal_targets: vec![RevealBinding {
            id: TargetId("statement".into()),
            delay_ms: 2_000.0,
        }],
        copy_source: "fn erode() {}".into(),
        ..ArtifactBinding::new(ARTIFACT, fragments)
    }
}

/// Engine over `backend` with default config, started at `now`.
pub fn engine(backend: FallbackStore, now: Timestamp) -> ErosionEngine {
    ErosionEngine::start(
        binding(16),
        EngineConfig::default(),
        backend,
        ObservationMode::AlwaysVisible,
        now,
    )
    .expect("default binding and config are valid")
}

/// Engine persisting into a shared in-memory medium.
pub fn engine_on(mem: &MemoryStore, now: Timestamp) -> ErosionEngine {
    engine(FallbackStore::new(Box::new(mem.clone())), now)
}

pub fn pointer_down(x: f64, y: f64) -> InteractionEvent {
    InteractionEvent::PointerDown {
        x,
        y,
        viewport_width: 1_280.0,
        viewport_height: 720.0,
        pointer: PointerKind::Mouse,
    }
}

pub fn mouse_move(x: f64, y: f64) -> InteractionEvent {
    InteractionEvent::PointerMove {
        x,
        y,
        pointer: PointerKind::Mouse,
    }
}

/// A medium that fails every call after `healthy_calls` successful ones.
#[derive(Debug, Default)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    pub healthy_calls: usize,
    calls: usize,
}

impl FaultyStore {
    pub fn failing_after(healthy_calls: usize) -> Self {
        Self {
            healthy_calls,
            ..Self::default()
        }
    }

    fn check(&self, key: &str, bytes: usize) -> Result<(), StoreError> {
        if self.calls >= self.healthy_calls {
            Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                bytes,
            })
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for FaultyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        // Reads don't count toward the limit; a primary that can't be read
        // from at all is modelled with `healthy_calls == 0`.
        if self.healthy_calls == 0 {
            return Err(StoreError::Unavailable("storage disabled".into()));
        }
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check(key, value.len())?;
        self.calls += 1;
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.check(key, 0)?;
        self.calls += 1;
        self.inner.remove(key)
    }
}
