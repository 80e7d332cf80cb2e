#![forbid(unsafe_code)]

//! Browser host for the erosion engine.
//!
//! The page drives everything from `requestAnimationFrame`: it pushes input
//! events as JSON, asks for a frame with `Date.now()` / `performance.now()`
//! readings, and applies the returned properties and classes. [`HostSession`]
//! holds that protocol and is target-independent; the `wasm-bindgen` surface
//! and the `localStorage` medium only exist on wasm32.

pub mod host;

#[cfg(target_arch = "wasm32")]
mod wasm;

pub use host::{HostFrame, HostSession};
