//! Engine constants. All durations are in milliseconds.

/// Version stamped into every persisted [`EngineState`](crate::types::EngineState).
///
/// Stored state carrying any other value is discarded on load.
pub const SCHEMA_VERSION: u32 = 3;

/// Hard upper bound on the pointer trace length.
pub const MAX_TRACE_LEN: usize = 24;

/// Device units per wheel notch. Wheel relief is normalized against this.
pub const WHEEL_NOTCH_UNITS: f64 = 120.0;

/// Reveal delays are capped here regardless of what the page asks for.
pub const MAX_REVEAL_DELAY_MS: f64 = 30_000.0;

/// Default storage namespace. Keys are `"{namespace}:{artifact_id}"`.
pub const DEFAULT_NAMESPACE: &str = "landscrap:erosion";

/// Largest fragment count a manifest may bind. Larger totals are clamped.
pub const MAX_FRAGMENTS: u32 = 10_000;

/// Labels cycled through by fragment index.
pub const RELATIVE_MARKERS: [&str; 3] = ["earlier", "later", "not yet"];

// --- Erosion model defaults ---

/// Exposure time at which time pressure saturates.
pub const DEFAULT_ELAPSED_MS_TO_MAX: f64 = 5_500.0;

/// Relief that fully cancels time pressure.
pub const DEFAULT_RELIEF_UNITS_TO_FULL: f64 = 100.0;

/// Ceiling on accumulated relief.
pub const DEFAULT_RELIEF_CAP: f64 = 100.0;

/// Relief half-life.
pub const DEFAULT_RELIEF_HALF_LIFE_MS: f64 = 2_400.0;

// --- Interaction defaults ---

/// Relief granted per pointer-down.
pub const DEFAULT_POINTER_DOWN_RELIEF: f64 = 16.0;

/// Relief granted per [`WHEEL_NOTCH_UNITS`] of wheel or scroll travel.
pub const DEFAULT_WHEEL_RELIEF_PER_NOTCH: f64 = 4.0;

/// Relief granted per pixel of sampled mouse travel.
pub const DEFAULT_MOVE_RELIEF_PER_PX: f64 = 0.04;

/// Minimum spacing between accepted pointer-move samples.
pub const DEFAULT_MOVE_SAMPLE_INTERVAL_MS: f64 = 32.0;

/// Resistance factors are clamped to this so scrolling never stops outright.
pub const DEFAULT_MAX_RESISTANCE: f64 = 0.95;

// --- Planner defaults ---

/// Window starts fall in `[0, START_RANGE)` of the global score.
pub const DEFAULT_START_RANGE: f64 = 0.8;

/// Widest window span (seed 0).
pub const DEFAULT_SPAN_MAX: f64 = 0.35;

/// Narrowest window span (seed approaching 1).
pub const DEFAULT_SPAN_MIN: f64 = 0.15;

/// Local erosion within this distance of 1.0 counts as erased.
pub const DEFAULT_ERASED_EPSILON: f64 = 1e-3;

// --- Persistence / render defaults ---

/// Trailing debounce window for persistence writes.
pub const DEFAULT_DEBOUNCE_MS: f64 = 300.0;

/// Period of the ambient oscillation.
pub const DEFAULT_PULSE_PERIOD_MS: f64 = 7_000.0;

/// How long a copy status stays visible.
pub const DEFAULT_COPY_INDICATOR_MS: f64 = 1_800.0;

/// Base drift hint emitted for fragment index 0.
pub const DRIFT_BASE: f64 = 0.018;

/// Drift hint increment per `index mod 5`.
pub const DRIFT_STEP: f64 = 0.009;
