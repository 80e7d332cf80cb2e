//! String-in, JSON-out session protocol between a page and the engine.

use std::collections::BTreeMap;

use erosion_core::config::EngineConfig;
use erosion_core::error::EngineError;
use erosion_core::traits::Clock;
use erosion_core::types::{TargetId, Timestamp};
use erosion_engine::render::{CLASS_ERASED, CLASS_REVEALED};
use erosion_engine::{
    ArtifactBinding, CopyStatus, ErosionEngine, Frame, InteractionEvent, ObservationMode,
    SystemClock, Teardown,
};
use erosion_store::FallbackStore;
use serde::Serialize;
use tracing::debug;

/// A frame plus the property maps the page applies verbatim.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HostFrame {
    #[serde(flatten)]
    pub frame: Frame,
    /// Custom properties for the artifact root.
    pub css: BTreeMap<&'static str, String>,
    /// Custom properties per fragment, in fragment order.
    pub fragment_css: Vec<BTreeMap<&'static str, String>>,
    pub erased_class: &'static str,
    pub revealed_class: &'static str,
}

impl From<Frame> for HostFrame {
    fn from(frame: Frame) -> Self {
        let css = frame.css_properties().into_iter().collect();
        let fragment_css = frame
            .fragments
            .iter()
            .map(|f| f.css_properties().into_iter().collect())
            .collect();
        Self {
            frame,
            css,
            fragment_css,
            erased_class: CLASS_ERASED,
            revealed_class: CLASS_REVEALED,
        }
    }
}

pub struct HostSession {
    engine: ErosionEngine,
    clock: SystemClock,
}

impl HostSession {
    /// Start from the page manifest and an optional config override.
    pub fn open(
        manifest_json: &str,
        config_json: Option<&str>,
        backend: FallbackStore,
        mode: ObservationMode,
        now: Timestamp,
    ) -> Result<Self, EngineError> {
        Self::open_with_clock(manifest_json, config_json, backend, mode, SystemClock::new(), now)
    }

    /// As [`HostSession::open`], reading later timestamps from `clock`.
    pub fn open_with_clock(
        manifest_json: &str,
        config_json: Option<&str>,
        backend: FallbackStore,
        mode: ObservationMode,
        clock: SystemClock,
        now: Timestamp,
    ) -> Result<Self, EngineError> {
        let binding = ArtifactBinding::from_json(manifest_json)?;
        let config = match config_json {
            Some(json) if !json.trim().is_empty() => EngineConfig::from_json(json)?,
            _ => EngineConfig::default(),
        };
        let engine = ErosionEngine::start(binding, config, backend, mode, now)?;
        Ok(Self { engine, clock })
    }

    /// Paired wall/monotonic reading from the host clocks.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn engine(&self) -> &ErosionEngine {
        &self.engine
    }

    /// Apply a JSON-encoded event. Returns the effect as JSON, or `None` if
    /// the event did not parse.
    pub fn push_event(&mut self, json: &str, now: Timestamp) -> Option<String> {
        let event: InteractionEvent = match serde_json::from_str(json) {
            Ok(event) => event,
            Err(e) => {
                debug!(error = %e, "ignoring unparseable event");
                return None;
            }
        };
        let effect = self.engine.handle(&event, now);
        serde_json::to_string(&effect).ok()
    }

    pub fn frame(&mut self, now: Timestamp) -> HostFrame {
        self.engine.tick(now).into()
    }

    /// Frame as JSON. An empty object if serialization fails, so the page
    /// loop keeps running.
    pub fn frame_json(&mut self, now: Timestamp) -> String {
        serde_json::to_string(&self.frame(now)).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn set_visible(&mut self, target_id: &str, visible: bool, now: Timestamp) {
        self.engine
            .set_visibility(&TargetId(target_id.to_string()), visible, now);
    }

    /// `"hidden"` for a lifecycle hide, anything else is an unload.
    pub fn teardown(&mut self, reason: &str, now: Timestamp) {
        self.engine.teardown(parse_teardown(reason), now);
    }

    pub fn copy_payload(&self) -> &str {
        &self.engine.binding().copy_source
    }

    /// Show the status of a copy the page ran itself. Unknown names are ignored.
    pub fn report_copy(&mut self, status: &str, now: Timestamp) {
        match parse_copy_status(status) {
            Some(status) => self.engine.report_copy(status, now),
            None => debug!(status, "unknown copy status"),
        }
    }

    pub fn flush_deadline(&self) -> Option<f64> {
        self.engine.flush_deadline()
    }
}

fn parse_teardown(reason: &str) -> Teardown {
    if reason.eq_ignore_ascii_case("hidden") {
        Teardown::Hidden
    } else {
        Teardown::Unload
    }
}

fn parse_copy_status(status: &str) -> Option<CopyStatus> {
    match status {
        "copied" => Some(CopyStatus::Copied),
        "copiedViaFallback" => Some(CopyStatus::CopiedViaFallback),
        "failed" => Some(CopyStatus::Failed),
        _ => None,
    }
}
