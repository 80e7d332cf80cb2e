//! # erosion-decay: time-driven erosion math.
//!
//! All functions here are deterministic and free of I/O:
//! - **Relief decay**: interaction credit fades continuously with a configured
//!   half-life, applied lazily whenever relief is read or added.
//! - **Erosion score**: a single global scalar in `[0, 1]`, rising with
//!   exposure time and suppressed by current relief.
//! - **Fragment planning**: each fragment gets a private window of the global
//!   score, derived from its seed, over which it eases from intact to erased.

pub mod curve;
pub mod model;
pub mod planner;
pub mod session;

pub use curve::{clamp01, smoothstep};
pub use model::ErosionModel;
pub use planner::{FragmentErosion, FragmentPlanner};
pub use session::SessionClock;
