//! Frame output consumed by the host page.
//!
//! A [`Frame`] is plain data: the host copies `css_properties` onto the
//! artifact root, applies per-fragment properties and class toggles, and sets
//! counter text. Nothing here touches a DOM.

use std::f64::consts::TAU;

use erosion_core::types::{EngineState, FragmentIndex, TargetId};
use erosion_decay::{FragmentErosion, clamp01};
use serde::Serialize;

use crate::binding::{ArtifactBinding, relative_marker};
use crate::copy::CopyStatus;

pub const CLASS_ERASED: &str = "is-erased";
pub const CLASS_REVEALED: &str = "is-revealed";

/// Counter text as shown on the page.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Counters {
    pub elapsed: String,
    pub clicks: String,
    pub scroll: String,
    pub distance: String,
    pub relief: String,
}

impl Counters {
    pub fn format(state: &EngineState, elapsed_ms: f64, relief_fraction: f64) -> Self {
        Self {
            elapsed: format!("{:.1}s", elapsed_ms.max(0.0) / 1_000.0),
            clicks: state.click_count.to_string(),
            scroll: format!("{:.0}", state.scroll_intensity),
            distance: format!("{:.0}px", state.move_distance_px),
            relief: format!("{:.0}%", clamp01(relief_fraction) * 100.0),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FragmentVisual {
    pub index: FragmentIndex,
    pub erosion: f64,
    pub erased: bool,
    pub drift_offset: f64,
    pub marker: &'static str,
}

impl FragmentVisual {
    pub fn css_properties(&self) -> [(&'static str, String); 2] {
        [
            ("--fragment-erosion", format!("{:.4}", self.erosion)),
            ("--drift-offset", format!("{:.4}", self.drift_offset)),
        ]
    }
}

/// Everything the host applies for one animation frame.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub frame_idx: u64,
    pub score: f64,
    pub elapsed_ms: f64,
    pub relief_units: f64,
    pub pulse: f64,
    pub trace_count: usize,
    pub counters: Counters,
    pub fragments: Vec<FragmentVisual>,
    /// Targets revealed during this frame only.
    pub revealed: Vec<TargetId>,
    pub copy_indicator: Option<&'static str>,
    /// A debounced or forced write happened during this frame.
    pub flushed: bool,
}

impl Frame {
    /// Custom properties for the artifact root.
    pub fn css_properties(&self) -> Vec<(&'static str, String)> {
        vec![
            ("--erosion", format!("{:.4}", self.score)),
            ("--relief", format!("{:.3}", self.relief_units)),
            ("--pulse", format!("{:.4}", self.pulse)),
            ("--trace-count", self.trace_count.to_string()),
        ]
    }

    /// `(fragment, class, on)` toggles for this frame.
    pub fn class_toggles(&self) -> Vec<(FragmentIndex, &'static str, bool)> {
        self.fragments
            .iter()
            .map(|f| (f.index, CLASS_ERASED, f.erased))
            .collect()
    }
}

/// Position in `[0, 1)` of the ambient cycle at `mono_ms`.
pub fn pulse_phase(mono_ms: f64, period_ms: f64) -> f64 {
    if !(mono_ms.is_finite() && period_ms.is_finite() && period_ms > 0.0) {
        return 0.0;
    }
    mono_ms.rem_euclid(period_ms) / period_ms
}

/// Ambient oscillation in `[0, 1]`, 0.5 at phase 0.
pub fn pulse(phase: f64) -> f64 {
    0.5 + 0.5 * (phase * TAU).sin()
}

/// Drift grows with both the fragment's hint and its erosion.
pub fn drift_offset(phase: f64, drift: f64, erosion: f64) -> f64 {
    (phase * TAU * (1.0 + drift * 10.0)).sin() * drift * erosion
}

/// Visuals for every fragment of `binding`.
pub fn fragment_visuals(
    binding: &ArtifactBinding,
    erosion: &[FragmentErosion],
    phase: f64,
) -> Vec<FragmentVisual> {
    erosion
        .iter()
        .map(|e| FragmentVisual {
            index: e.fragment_index,
            erosion: e.erosion,
            erased: e.erased,
            drift_offset: drift_offset(phase, binding.drift_for(e.fragment_index), e.erosion),
            marker: relative_marker(e.fragment_index),
        })
        .collect()
}

pub fn copy_label(status: Option<CopyStatus>) -> Option<&'static str> {
    status.map(CopyStatus::label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn pulse_cycle() {
        assert_eq!(pulse_phase(0.0, 7_000.0), 0.0);
        assert_eq!(pulse_phase(10_500.0, 7_000.0), 0.5);
        assert!((pulse(0.25) - 1.0).abs() < 1e-12);
        assert!((pulse(0.75) - 0.0).abs() < 1e-12);
        assert_eq!(pulse_phase(100.0, 0.0), 0.0);
    }

    #[test]
    fn intact_fragments_do_not_drift() {
        assert_eq!(drift_offset(0.3, 0.054, 0.0), 0.0);
        assert!(drift_offset(0.1, 0.054, 1.0).abs() <= 0.054);
    }

    #[test]
    fn counters_format() {
        let state = EngineState {
            click_count: 7,
            scroll_intensity: 359.6,
            move_distance_px: 1_204.2,
            ..EngineState::default()
        };
        let c = Counters::format(&state, 12_345.0, 0.456);
        assert_eq!(c.elapsed, "12.3s");
        assert_eq!(c.clicks, "7");
        assert_eq!(c.scroll, "360");
        assert_eq!(c.distance, "1204px");
        assert_eq!(c.relief, "46%");
    }

    #[test]
    fn visuals_carry_markers_and_classes() {
        let binding = ArtifactBinding::new("a", 2).normalized().unwrap();
        let erosion = [
            FragmentErosion {
                fragment_index: FragmentIndex(0),
                erosion: 1.0,
                erased: true,
            },
            FragmentErosion {
                fragment_index: FragmentIndex(1),
                erosion: 0.2,
                erased: false,
            },
        ];
        let visuals = fragment_visuals(&binding, &erosion, 0.1);
        assert_eq!(visuals[1].marker, "later");
        let frame = Frame {
            frame_idx: 1,
            score: 0.5,
            elapsed_ms: 0.0,
            relief_units: 0.0,
            pulse: 0.5,
            trace_count: 3,
            counters: Counters::format(&EngineState::default(), 0.0, 0.0),
            fragments: visuals,
            revealed: Vec::new(),
            copy_indicator: None,
            flushed: false,
        };
        assert_eq!(
            frame.class_toggles(),
            vec![
                (FragmentIndex(0), CLASS_ERASED, true),
                (FragmentIndex(1), CLASS_ERASED, false),
            ]
        );
        assert!(frame.css_properties().contains(&("--trace-count", "3".to_string())));
        assert_eq!(frame.fragments[0].css_properties()[0].1, "1.0000");
    }

    proptest! {
        #[test]
        fn pulse_stays_in_unit_range(t in 0.0f64..1e9, period in 1.0f64..1e5) {
            let phase = pulse_phase(t, period);
            prop_assert!((0.0..1.0).contains(&phase));
            let p = pulse(phase);
            prop_assert!((0.0..=1.0).contains(&p));
        }
    }
}
