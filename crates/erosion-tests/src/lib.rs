//! Scenario and property tests spanning the erosion crates.
//!
//! Suites live under `tests/`; this library only carries the shared helpers.

pub mod helpers;
