//! Erosion model: relief decay and the global erosion score.
//!
//! Relief is decayed lazily. Every read or write first applies the decay owed
//! since `relief_updated_ms`, so updates from wheel, pointer and frame ticks
//! stay consistent against one logical clock regardless of their order.

use erosion_core::config::ErosionConfig;
use erosion_core::types::EngineState;

use crate::curve::clamp01;

/// Stateless calculator over an [`EngineState`]'s relief fields.
#[derive(Debug, Clone)]
pub struct ErosionModel {
    config: ErosionConfig,
}

impl Default for ErosionModel {
    fn default() -> Self {
        Self::new(ErosionConfig::default())
    }
}

impl ErosionModel {
    pub fn new(config: ErosionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ErosionConfig {
        &self.config
    }

    /// Fraction of relief remaining after `dt_ms`: `0.5 ^ (dt / half_life)`.
    ///
    /// Negative or NaN durations keep everything.
    pub fn retention(&self, dt_ms: f64) -> f64 {
        let dt = dt_ms.max(0.0);
        if dt == 0.0 {
            return 1.0;
        }
        0.5f64.powf(dt / self.config.relief_half_life_ms)
    }

    /// Apply the decay owed since the last update and move the stamp to `now_ms`.
    ///
    /// Calling twice with the same `now_ms` changes nothing the second time.
    pub fn decay_relief(&self, state: &mut EngineState, now_ms: f64) {
        if !now_ms.is_finite() {
            return;
        }
        let dt = (now_ms - state.relief_updated_ms).max(0.0);
        if dt > 0.0 {
            state.relief_units *= self.retention(dt);
        }
        state.relief_updated_ms = now_ms;
    }

    /// Grant relief, clamped to the cap. Returns the amount actually added.
    ///
    /// Non-positive and non-finite grants are ignored without touching state.
    pub fn add_relief(&self, state: &mut EngineState, units: f64, now_ms: f64) -> f64 {
        if !(units.is_finite() && units > 0.0) {
            return 0.0;
        }
        self.decay_relief(state, now_ms);
        let before = state.relief_units;
        state.relief_units = (before + units).min(self.config.relief_cap).max(0.0);
        state.relief_units - before
    }

    /// Current erosion score for `elapsed_ms` of exposure, decaying relief first.
    pub fn erosion_score(&self, state: &mut EngineState, elapsed_ms: f64, now_ms: f64) -> f64 {
        self.decay_relief(state, now_ms);
        self.score_for(elapsed_ms, state.relief_units)
    }

    /// Pure score: `clamp01(time_pressure − relief_fraction)`.
    pub fn score_for(&self, elapsed_ms: f64, relief_units: f64) -> f64 {
        let time_pressure = clamp01(elapsed_ms / self.config.elapsed_ms_to_max);
        let relief_fraction = clamp01(relief_units / self.config.relief_units_to_full);
        clamp01(time_pressure - relief_fraction)
    }

    /// Relief as a fraction of the amount that fully cancels time pressure.
    pub fn relief_fraction(&self, relief_units: f64) -> f64 {
        clamp01(relief_units / self.config.relief_units_to_full)
    }
}
