//! Copy-source control with a transient status indicator.

use erosion_core::error::ClipboardError;
use erosion_core::traits::Clipboard;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CopyStatus {
    Copied,
    CopiedViaFallback,
    Failed,
}

impl CopyStatus {
    /// Text shown in the indicator.
    pub fn label(self) -> &'static str {
        match self {
            Self::Copied | Self::CopiedViaFallback => "copied",
            Self::Failed => "copy failed",
        }
    }
}

/// Copies the artifact source. The primary clipboard is tried first, then the
/// selection-based fallback. The resulting status stays visible for
/// `indicator_ms`.
#[derive(Debug, Clone)]
pub struct CopyController {
    payload: String,
    indicator_ms: f64,
    shown: Option<(CopyStatus, f64)>,
}

impl CopyController {
    pub fn new(payload: impl Into<String>, indicator_ms: f64) -> Self {
        Self {
            payload: payload.into(),
            indicator_ms: if indicator_ms.is_finite() { indicator_ms.max(0.0) } else { 0.0 },
            shown: None,
        }
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Copy the payload. `primary` is `None` when the host has no clipboard API.
    pub fn copy(
        &mut self,
        primary: Option<&mut dyn Clipboard>,
        fallback: &mut dyn Clipboard,
        mono_now_ms: f64,
    ) -> CopyStatus {
        let primary_result = match primary {
            Some(clipboard) => clipboard.write_text(&self.payload),
            None => Err(ClipboardError::Unavailable),
        };
        let status = match primary_result {
            Ok(()) => CopyStatus::Copied,
            Err(e) => {
                debug!(error = %e, "primary clipboard failed, trying selection");
                match fallback.write_text(&self.payload) {
                    Ok(()) => CopyStatus::CopiedViaFallback,
                    Err(e) => {
                        warn!(error = %e, "copy failed");
                        CopyStatus::Failed
                    }
                }
            }
        };
        self.report(status, mono_now_ms);
        status
    }

    /// Show a status produced outside the controller (e.g. by an async host API).
    pub fn report(&mut self, status: CopyStatus, mono_now_ms: f64) {
        self.shown = Some((status, mono_now_ms + self.indicator_ms));
    }

    /// Status to show at `mono_now_ms`; clears itself once expired.
    pub fn indicator(&mut self, mono_now_ms: f64) -> Option<CopyStatus> {
        match self.shown {
            Some((status, until)) if mono_now_ms < until => Some(status),
            Some(_) => {
                self.shown = None;
                None
            }
            None => None,
        }
    }
}
