//! Core engine types: persisted state, derived fragment plans, timestamps.
//!
//! All times are milliseconds as `f64`, matching the host clocks they come from.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_TRACE_LEN, SCHEMA_VERSION};

/// A pair of clock readings taken at the same instant.
///
/// `wall_ms` is wall-clock time (epoch based) and may jump between sessions.
/// `mono_ms` is a monotonic reading that is only meaningful within one session.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Timestamp {
    pub wall_ms: f64,
    pub mono_ms: f64,
}

impl Timestamp {
    pub fn new(wall_ms: f64, mono_ms: f64) -> Self {
        Self { wall_ms, mono_ms }
    }

    /// Both clocks moved forward by `dt_ms`.
    pub fn advanced(self, dt_ms: f64) -> Self {
        Self {
            wall_ms: self.wall_ms + dt_ms,
            mono_ms: self.mono_ms + dt_ms,
        }
    }
}

/// Class of device behind a pointer event.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

impl PointerKind {
    /// Whether movement from this device counts toward distance and relief.
    pub fn tracks_motion(&self) -> bool {
        matches!(self, Self::Mouse)
    }
}

/// One normalized pointer position. `x` and `y` are in `[0, 1]` of the viewport.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    pub t: f64,
}

/// Index of a fragment within its artifact.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct FragmentIndex(pub u32);

impl fmt::Display for FragmentIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a duration-gated (reveal) target.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TargetId(pub String);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a resistance zone.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ZoneId(pub String);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The engine's only mutable entity. One per artifact per tab.
///
/// Persisted as camelCase JSON. Missing fields fall back to defaults when
/// loading, so a partially written payload still merges cleanly.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineState {
    pub schema_version: u32,
    /// Exposure time across sessions. Never includes gaps between sessions.
    pub total_elapsed_ms: f64,
    pub click_count: u64,
    pub scroll_intensity: f64,
    pub move_distance_px: f64,
    /// Always within `[0, relief_cap]`.
    pub relief_units: f64,
    /// Wall-clock time relief decay was last applied.
    pub relief_updated_ms: f64,
    /// Most recent last. At most [`MAX_TRACE_LEN`] entries.
    pub pointer_trace: VecDeque<PointerSample>,
    pub last_seen_ms: f64,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            total_elapsed_ms: 0.0,
            click_count: 0,
            scroll_intensity: 0.0,
            move_distance_px: 0.0,
            relief_units: 0.0,
            relief_updated_ms: 0.0,
            pointer_trace: VecDeque::new(),
            last_seen_ms: 0.0,
        }
    }
}

impl EngineState {
    /// Fresh state for a first visit at wall-clock `now_ms`.
    pub fn fresh(now_ms: f64) -> Self {
        Self {
            relief_updated_ms: now_ms,
            last_seen_ms: now_ms,
            ..Self::default()
        }
    }

    /// Append a trace sample, evicting the oldest entries beyond `capacity`.
    ///
    /// `capacity` is itself capped at [`MAX_TRACE_LEN`].
    pub fn push_trace(&mut self, sample: PointerSample, capacity: usize) {
        let capacity = capacity.min(MAX_TRACE_LEN);
        if capacity == 0 {
            self.pointer_trace.clear();
            return;
        }
        self.pointer_trace.push_back(sample);
        while self.pointer_trace.len() > capacity {
            self.pointer_trace.pop_front();
        }
    }

    /// Copy with count-like fields rounded for compact storage.
    ///
    /// Times and accumulated magnitudes become integers. Relief is cut to
    /// three decimals and trace coordinates to four; both are lossy, and a
    /// reload sees the rounded values. Compacting twice is a no-op.
    pub fn compacted(&self) -> Self {
        Self {
            schema_version: self.schema_version,
            total_elapsed_ms: self.total_elapsed_ms.round(),
            click_count: self.click_count,
            scroll_intensity: self.scroll_intensity.round(),
            move_distance_px: self.move_distance_px.round(),
            relief_units: round_to(self.relief_units, 1e3),
            relief_updated_ms: self.relief_updated_ms.round(),
            pointer_trace: self
                .pointer_trace
                .iter()
                .map(|p| PointerSample {
                    x: round_to(p.x, 1e4),
                    y: round_to(p.y, 1e4),
                    t: p.t.round(),
                })
                .collect(),
            last_seen_ms: self.last_seen_ms.round(),
        }
    }

    /// Repair a loaded state so every invariant holds.
    ///
    /// Non-finite or negative magnitudes reset to zero, relief is clamped into
    /// `[0, relief_cap]`, and the trace keeps only its newest entries.
    pub fn sanitized(mut self, relief_cap: f64) -> Self {
        self.total_elapsed_ms = non_negative(self.total_elapsed_ms);
        self.scroll_intensity = non_negative(self.scroll_intensity);
        self.move_distance_px = non_negative(self.move_distance_px);
        self.relief_units = non_negative(self.relief_units).min(relief_cap.max(0.0));
        if !self.relief_updated_ms.is_finite() {
            self.relief_updated_ms = 0.0;
        }
        if !self.last_seen_ms.is_finite() {
            self.last_seen_ms = 0.0;
        }
        self.pointer_trace
            .retain(|p| p.x.is_finite() && p.y.is_finite() && p.t.is_finite());
        while self.pointer_trace.len() > MAX_TRACE_LEN {
            self.pointer_trace.pop_front();
        }
        self
    }
}

fn round_to(value: f64, scale: f64) -> f64 {
    (value * scale).round() / scale
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}

/// Private erosion window of one fragment, derived from its seed.
///
/// Not persisted: recomputed identically on every page load.
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FragmentPlan {
    pub fragment_index: FragmentIndex,
    /// In `[0, start_range)`.
    pub erosion_window_start: f64,
    pub erosion_window_span: f64,
}

impl FragmentPlan {
    /// Global score at which this fragment is fully eroded.
    pub fn window_end(&self) -> f64 {
        self.erosion_window_start + self.erosion_window_span
    }
}
