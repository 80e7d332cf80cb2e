//! Engine configuration.
//!
//! Every tuning constant is exposed here rather than hard-coded. The erosion
//! properties hold for any configuration that passes [`EngineConfig::validate`].
//! On the wire the config is camelCase JSON with every field optional.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;

/// Top-level configuration for one engine instance.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub erosion: ErosionConfig,
    pub interaction: InteractionConfig,
    pub planner: PlannerConfig,
    pub persistence: PersistenceConfig,
    pub visibility: VisibilityConfig,
    pub render: RenderConfig,
}

/// Erosion score and relief decay parameters.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ErosionConfig {
    pub elapsed_ms_to_max: f64,
    pub relief_units_to_full: f64,
    pub relief_cap: f64,
    pub relief_half_life_ms: f64,
}

impl Default for ErosionConfig {
    fn default() -> Self {
        Self {
            elapsed_ms_to_max: DEFAULT_ELAPSED_MS_TO_MAX,
            relief_units_to_full: DEFAULT_RELIEF_UNITS_TO_FULL,
            relief_cap: DEFAULT_RELIEF_CAP,
            relief_half_life_ms: DEFAULT_RELIEF_HALF_LIFE_MS,
        }
    }
}

/// Interaction → relief mapping.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct InteractionConfig {
    pub pointer_down_relief: f64,
    /// Relief per 120 device units of wheel or scroll travel.
    pub wheel_relief_per_notch: f64,
    pub move_relief_per_px: f64,
    pub move_sample_interval_ms: f64,
    pub trace_capacity: usize,
    pub max_resistance: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            pointer_down_relief: DEFAULT_POINTER_DOWN_RELIEF,
            wheel_relief_per_notch: DEFAULT_WHEEL_RELIEF_PER_NOTCH,
            move_relief_per_px: DEFAULT_MOVE_RELIEF_PER_PX,
            move_sample_interval_ms: DEFAULT_MOVE_SAMPLE_INTERVAL_MS,
            trace_capacity: MAX_TRACE_LEN,
            max_resistance: DEFAULT_MAX_RESISTANCE,
        }
    }
}

/// Shape of per-fragment erosion windows.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PlannerConfig {
    pub start_range: f64,
    pub span_max: f64,
    pub span_min: f64,
    pub erased_epsilon: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            start_range: DEFAULT_START_RANGE,
            span_max: DEFAULT_SPAN_MAX,
            span_min: DEFAULT_SPAN_MIN,
            erased_epsilon: DEFAULT_ERASED_EPSILON,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistenceConfig {
    pub debounce_ms: f64,
    pub namespace: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl PersistenceConfig {
    /// Storage key for an artifact's state.
    pub fn storage_key(&self, artifact_id: &str) -> String {
        format!("{}:{}", self.namespace, artifact_id)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VisibilityConfig {
    /// Applied on top of [`MAX_REVEAL_DELAY_MS`]; the lower of the two wins.
    pub max_reveal_delay_ms: f64,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            max_reveal_delay_ms: MAX_REVEAL_DELAY_MS,
        }
    }
}

impl VisibilityConfig {
    /// Effective reveal delay for a configured hint.
    pub fn effective_delay(&self, requested_ms: f64) -> f64 {
        let cap = self.max_reveal_delay_ms.min(MAX_REVEAL_DELAY_MS);
        if requested_ms.is_finite() {
            requested_ms.clamp(0.0, cap)
        } else {
            cap
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    pub pulse_period_ms: f64,
    pub copy_indicator_ms: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pulse_period_ms: DEFAULT_PULSE_PERIOD_MS,
            copy_indicator_ms: DEFAULT_COPY_INDICATOR_MS,
        }
    }
}

impl EngineConfig {
    /// Parse a camelCase JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let e = &self.erosion;
        positive("erosion.elapsedMsToMax", e.elapsed_ms_to_max)?;
        positive("erosion.reliefUnitsToFull", e.relief_units_to_full)?;
        non_negative("erosion.reliefCap", e.relief_cap)?;
        positive("erosion.reliefHalfLifeMs", e.relief_half_life_ms)?;

        let i = &self.interaction;
        non_negative("interaction.pointerDownRelief", i.pointer_down_relief)?;
        non_negative("interaction.wheelReliefPerNotch", i.wheel_relief_per_notch)?;
        non_negative("interaction.moveReliefPerPx", i.move_relief_per_px)?;
        non_negative("interaction.moveSampleIntervalMs", i.move_sample_interval_ms)?;
        if !(0.0..1.0).contains(&i.max_resistance) {
            return Err(invalid("interaction.maxResistance", "must be in [0, 1)"));
        }

        let p = &self.planner;
        if !(p.start_range > 0.0 && p.start_range < 1.0) {
            return Err(invalid("planner.startRange", "must be in (0, 1)"));
        }
        for (name, span) in [("planner.spanMax", p.span_max), ("planner.spanMin", p.span_min)] {
            if !(span > 0.0 && span <= 1.0) {
                return Err(invalid(name, "must be in (0, 1]"));
            }
        }
        if p.span_min > p.span_max {
            return Err(invalid("planner.spanMin", "must not exceed spanMax"));
        }
        if !(p.erased_epsilon >= 0.0 && p.erased_epsilon < 1.0) {
            return Err(invalid("planner.erasedEpsilon", "must be in [0, 1)"));
        }

        non_negative("persistence.debounceMs", self.persistence.debounce_ms)?;
        if self.persistence.namespace.is_empty() {
            return Err(invalid("persistence.namespace", "must not be empty"));
        }
        non_negative("visibility.maxRevealDelayMs", self.visibility.max_reveal_delay_ms)?;
        positive("render.pulsePeriodMs", self.render.pulse_period_ms)?;
        non_negative("render.copyIndicatorMs", self.render.copy_indicator_ms)?;
        Ok(())
    }
}

fn invalid(name: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.to_string(),
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(name, &format!("must be finite and > 0, got {value}")))
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(name, &format!("must be finite and >= 0, got {value}")))
    }
}
