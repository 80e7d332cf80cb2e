//! Recorded page traces.
//!
//! One JSON object per line, ordered by `atMs` (monotonic ms since page load):
//!
//! ```text
//! {"atMs": 120, "event": {"type": "pointerDown", "x": 10, "y": 20, "viewportWidth": 1280, "viewportHeight": 720}}
//! {"atMs": 400, "visible": {"id": "statement", "visible": true}}
//! {"atMs": 900, "copy": "failed"}
//! {"atMs": 5000, "teardown": "hidden"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use anyhow::{Context, Result, bail};
use erosion_engine::{CopyStatus, InteractionEvent};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityChange {
    pub id: String,
    pub visible: bool,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TeardownReason {
    Unload,
    Hidden,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CopyOutcome {
    Copied,
    CopiedViaFallback,
    Failed,
}

impl From<CopyOutcome> for CopyStatus {
    fn from(outcome: CopyOutcome) -> Self {
        match outcome {
            CopyOutcome::Copied => CopyStatus::Copied,
            CopyOutcome::CopiedViaFallback => CopyStatus::CopiedViaFallback,
            CopyOutcome::Failed => CopyStatus::Failed,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum TraceAction {
    Event(InteractionEvent),
    Visible(VisibilityChange),
    Copy(CopyOutcome),
    Teardown(TeardownReason),
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TraceLine {
    pub at_ms: f64,
    #[serde(flatten)]
    pub action: TraceAction,
}

/// Parse a whole trace. Times must be finite and non-decreasing.
pub fn parse_trace(text: &str) -> Result<Vec<TraceLine>> {
    let mut lines = Vec::new();
    let mut last = 0.0;
    for (n, raw) in text.lines().enumerate() {
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with('#') {
            continue;
        }
        let line: TraceLine =
            serde_json::from_str(raw).with_context(|| format!("trace line {}", n + 1))?;
        if !line.at_ms.is_finite() || line.at_ms < last {
            bail!("trace line {}: atMs {} is out of order", n + 1, line.at_ms);
        }
        last = line.at_ms;
        lines.push(line);
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_action() {
        let text = r#"
            # recorded 2024-03-01
            {"atMs": 120, "event": {"type": "scroll", "deltaY": 80}}
            {"atMs": 400, "visible": {"id": "statement", "visible": true}}
            {"atMs": 900, "copy": "copiedViaFallback"}
            {"atMs": 5000, "teardown": "hidden"}
        "#;
        let lines = parse_trace(text).unwrap();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0].action,
            TraceAction::Event(InteractionEvent::Scroll { delta_y: 80.0 })
        );
        assert_eq!(lines[2].action, TraceAction::Copy(CopyOutcome::CopiedViaFallback));
        assert_eq!(lines[3].action, TraceAction::Teardown(TeardownReason::Hidden));
    }

    #[test]
    fn rejects_time_going_backwards() {
        let text = "{\"atMs\": 10, \"copy\": \"copied\"}\n{\"atMs\": 5, \"copy\": \"copied\"}";
        let err = parse_trace(text).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn reports_bad_line_number() {
        let err = parse_trace("\n{\"atMs\": 1, \"bogus\": 1}").unwrap_err();
        assert!(format!("{err:#}").contains("trace line 2"), "{err:#}");
    }
}
