//! JSON encoding of [`EngineState`].
//!
//! Stored payloads are the compacted state (see [`EngineState::compacted`]).
//! Decoding checks `schemaVersion` before anything else: a payload from any
//! other version is rejected whole, never partially migrated.

use std::collections::VecDeque;

use erosion_core::constants::SCHEMA_VERSION;
use erosion_core::error::StateDecodeError;
use erosion_core::types::{EngineState, PointerSample};
use serde_json::{Map, Value};

/// Serialize the compacted form of `state`, stamped with the current schema.
pub fn encode_state(state: &EngineState) -> String {
    let mut compact = state.compacted();
    compact.schema_version = SCHEMA_VERSION;
    // EngineState has only string keys and plain numbers; serialization cannot fail.
    serde_json::to_string(&compact).unwrap_or_default()
}

/// Parse a stored payload, merge it over defaults and repair invariants.
///
/// Only an unparseable payload or a schema mismatch is an error. Each field is
/// merged on its own: a missing, `null`, negative or mistyped value takes the
/// default, and trace entries that are not three finite numbers are dropped.
pub fn decode_state(json: &str, relief_cap: f64) -> Result<EngineState, StateDecodeError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| StateDecodeError::Malformed(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(StateDecodeError::Malformed("not a JSON object".into()));
    };
    let found = fields.get("schemaVersion").and_then(Value::as_u64);
    if found != Some(u64::from(SCHEMA_VERSION)) {
        return Err(StateDecodeError::SchemaMismatch {
            found,
            expected: SCHEMA_VERSION,
        });
    }

    let defaults = EngineState::default();
    let state = EngineState {
        schema_version: SCHEMA_VERSION,
        total_elapsed_ms: magnitude(&fields, "totalElapsedMs")
            .unwrap_or(defaults.total_elapsed_ms),
        click_count: count(&fields, "clickCount").unwrap_or(defaults.click_count),
        scroll_intensity: magnitude(&fields, "scrollIntensity")
            .unwrap_or(defaults.scroll_intensity),
        move_distance_px: magnitude(&fields, "moveDistancePx")
            .unwrap_or(defaults.move_distance_px),
        relief_units: magnitude(&fields, "reliefUnits").unwrap_or(defaults.relief_units),
        relief_updated_ms: finite(&fields, "reliefUpdatedMs")
            .unwrap_or(defaults.relief_updated_ms),
        pointer_trace: trace(fields.get("pointerTrace")),
        last_seen_ms: finite(&fields, "lastSeenMs").unwrap_or(defaults.last_seen_ms),
    };
    Ok(state.sanitized(relief_cap))
}

fn finite(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    fields
        .get(key)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
}

fn magnitude(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    finite(fields, key).filter(|v| *v >= 0.0)
}

/// Non-negative integer. Whole-valued floats are accepted.
fn count(fields: &Map<String, Value>, key: &str) -> Option<u64> {
    let value = fields.get(key)?;
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0)
            .map(|v| v as u64)
    })
}

fn trace(value: Option<&Value>) -> VecDeque<PointerSample> {
    let Some(Value::Array(entries)) = value else {
        return VecDeque::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let point = entry.as_object()?;
            Some(PointerSample {
                x: finite(point, "x")?,
                y: finite(point, "y")?,
                t: finite(point, "t")?,
            })
        })
        .collect()
}
