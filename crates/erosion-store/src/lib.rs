//! # erosion-store: engine state persistence.
//!
//! Storage is capability-abstracted: every medium implements
//! [`KeyValueStore`](erosion_core::traits::KeyValueStore) and the engine talks
//! to a [`FallbackStore`] that silently degrades to memory on the first fault.
//! Reads and writes from the engine's point of view never fail.
//!
//! Writes are coalesced by a [`FlushScheduler`] and forced on page teardown.

pub mod codec;
pub mod debounce;
pub mod fallback;
pub mod file;
pub mod memory;
pub mod state_store;

pub use debounce::FlushScheduler;
pub use fallback::FallbackStore;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use state_store::StateStore;
