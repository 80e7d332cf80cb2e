//! # erosion-engine
//! The in-page erosion engine: one owned [`ErosionEngine`] per artifact,
//! driven by host events and animation-frame ticks.
//!
//! Data flows one way: interactions feed relief and counters, the erosion
//! model and fragment planner feed the render frame, and visibility gating
//! runs alongside on its own path. Persistence is debounced and forced on
//! teardown.

pub mod binding;
pub mod clock;
pub mod copy;
pub mod engine;
pub mod interaction;
pub mod render;
pub mod visibility;

pub use binding::ArtifactBinding;
pub use clock::SystemClock;
pub use copy::{CopyController, CopyStatus};
pub use engine::{ErosionEngine, Teardown};
pub use interaction::{Effect, InteractionEvent, InteractionListener};
pub use render::Frame;
pub use visibility::{ObservationMode, VisibilityTracker};
