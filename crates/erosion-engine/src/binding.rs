//! Artifact manifest supplied by the rendered page.
//!
//! The page embeds a JSON manifest describing what the engine drives: the
//! artifact id, the fragment count with per-fragment drift hints, reveal
//! targets with delay hints, resistance zones, and the copy-source text.
//! A bad entry is dropped with a warning; only an unusable manifest as a
//! whole is an error.

use std::collections::BTreeMap;

use erosion_core::constants::{DRIFT_BASE, DRIFT_STEP, MAX_FRAGMENTS, RELATIVE_MARKERS};
use erosion_core::error::BindingError;
use erosion_core::types::{FragmentIndex, TargetId, ZoneId};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FragmentBinding {
    pub index: FragmentIndex,
    /// Drift-rate hint. Missing hints use [`default_drift`].
    #[serde(default)]
    pub drift: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RevealBinding {
    pub id: TargetId,
    pub delay_ms: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ZoneBinding {
    pub id: ZoneId,
    pub resistance: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactBinding {
    pub artifact_id: String,
    pub fragment_total: u32,
    #[serde(default)]
    pub fragments: Vec<FragmentBinding>,
    #[serde(default)]
    pub reveal_targets: Vec<RevealBinding>,
    #[serde(default)]
    pub zones: Vec<ZoneBinding>,
    #[serde(default)]
    pub copy_source: String,
}

/// Drift hint the renderer emits for a fragment: `0.018 + (index mod 5) * 0.009`.
pub fn default_drift(index: FragmentIndex) -> f64 {
    DRIFT_BASE + f64::from(index.0 % 5) * DRIFT_STEP
}

/// Rotating temporal label for a fragment.
pub fn relative_marker(index: FragmentIndex) -> &'static str {
    RELATIVE_MARKERS[index.0 as usize % RELATIVE_MARKERS.len()]
}

impl ArtifactBinding {
    /// Minimal binding: `fragment_total` fragments with default drift, nothing else.
    pub fn new(artifact_id: impl Into<String>, fragment_total: u32) -> Self {
        Self {
            artifact_id: artifact_id.into(),
            fragment_total,
            fragments: Vec::new(),
            reveal_targets: Vec::new(),
            zones: Vec::new(),
            copy_source: String::new(),
        }
    }

    /// Parse and normalize a page manifest.
    pub fn from_json(json: &str) -> Result<Self, BindingError> {
        let raw: Self =
            serde_json::from_str(json).map_err(|e| BindingError::Parse(e.to_string()))?;
        raw.normalized()
    }

    /// Repair the manifest so every fragment `0..fragment_total` appears once,
    /// in order, with a finite drift hint. Totals above [`MAX_FRAGMENTS`] are
    /// clamped.
    pub fn normalized(mut self) -> Result<Self, BindingError> {
        if self.artifact_id.trim().is_empty() {
            return Err(BindingError::EmptyArtifactId);
        }
        if self.fragment_total > MAX_FRAGMENTS {
            warn!(
                artifact = %self.artifact_id,
                requested = self.fragment_total,
                max = MAX_FRAGMENTS,
                "clamping fragment total"
            );
            self.fragment_total = MAX_FRAGMENTS;
        }

        let mut by_index: BTreeMap<FragmentIndex, FragmentBinding> = BTreeMap::new();
        for fragment in std::mem::take(&mut self.fragments) {
            if let Err(e) = self.check_fragment(&fragment, &by_index) {
                warn!(artifact = %self.artifact_id, error = %e, "dropping fragment binding");
                continue;
            }
            by_index.insert(fragment.index, fragment);
        }

        self.fragments = (0..self.fragment_total)
            .map(|i| {
                let index = FragmentIndex(i);
                let drift = by_index
                    .get(&index)
                    .and_then(|f| f.drift)
                    .filter(|d| d.is_finite() && *d >= 0.0)
                    .unwrap_or_else(|| default_drift(index));
                FragmentBinding {
                    index,
                    drift: Some(drift),
                }
            })
            .collect();
        Ok(self)
    }

    fn check_fragment(
        &self,
        fragment: &FragmentBinding,
        seen: &BTreeMap<FragmentIndex, FragmentBinding>,
    ) -> Result<(), BindingError> {
        if fragment.index.0 >= self.fragment_total {
            return Err(BindingError::FragmentIndexOutOfRange {
                index: fragment.index.0,
                total: self.fragment_total,
            });
        }
        if seen.contains_key(&fragment.index) {
            return Err(BindingError::DuplicateFragment(fragment.index.0));
        }
        Ok(())
    }

    /// Drift hint for `index` (default formula if unbound).
    pub fn drift_for(&self, index: FragmentIndex) -> f64 {
        self.fragments
            .get(index.0 as usize)
            .filter(|f| f.index == index)
            .and_then(|f| f.drift)
            .unwrap_or_else(|| default_drift(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "artifactId": "artifact123abc",
        "fragmentTotal": 3,
        "fragments": [
            {"index": 0, "drift": 0.018},
            {"index": 2, "drift": 0.036},
            {"index": 7, "drift": 0.5},
            {"index": 2, "drift": 0.9}
        ],
        "revealTargets": [{"id": "statement", "delayMs": 4000}],
        "zones": [{"id": "artifact", "resistance": 0.6}],
        "copySource": "fn main() {}"
    }"#;

    #[test]
    fn parses_manifest() {
        let b = ArtifactBinding::from_json(MANIFEST).unwrap();
        assert_eq!(b.artifact_id, "artifact123abc");
        assert_eq!(b.reveal_targets[0].delay_ms, 4_000.0);
        assert_eq!(b.zones[0].resistance, 0.6);
        assert_eq!(b.copy_source, "fn main() {}");
    }

    #[test]
    fn normalizes_fragments() {
        let b = ArtifactBinding::from_json(MANIFEST).unwrap();
        assert_eq!(b.fragments.len(), 3);
        assert_eq!(b.drift_for(FragmentIndex(0)), 0.018);
        // Missing fragment 1 gets the default hint.
        assert_eq!(b.drift_for(FragmentIndex(1)), default_drift(FragmentIndex(1)));
        // First binding for a duplicated index wins.
        assert_eq!(b.drift_for(FragmentIndex(2)), 0.036);
    }

    #[test]
    fn empty_artifact_id_is_rejected() {
        let json = r#"{"artifactId": "  ", "fragmentTotal": 1}"#;
        assert_eq!(
            ArtifactBinding::from_json(json),
            Err(BindingError::EmptyArtifactId)
        );
    }

    #[test]
    fn malformed_manifest_is_parse_error() {
        assert!(matches!(
            ArtifactBinding::from_json("{\"artifactId\": 5}"),
            Err(BindingError::Parse(_))
        ));
    }

    #[test]
    fn default_drift_matches_renderer() {
        let hints: Vec<f64> = (0..6).map(|i| default_drift(FragmentIndex(i))).collect();
        let expected = [0.018, 0.027, 0.036, 0.045, 0.054, 0.018];
        for (h, e) in hints.iter().zip(expected) {
            assert!((h - e).abs() < 1e-12, "{h} != {e}");
        }
    }

    #[test]
    fn markers_cycle() {
        let markers: Vec<&str> = (0..6).map(|i| relative_marker(FragmentIndex(i))).collect();
        assert_eq!(
            markers,
            vec!["earlier", "later", "not yet", "earlier", "later", "not yet"]
        );
    }

    #[test]
    fn huge_fragment_total_is_clamped() {
        let json = r#"{"artifactId": "a", "fragmentTotal": 4294967295,
            "fragments": [{"index": 3, "drift": 0.05}, {"index": 4000000000, "drift": 0.1}]}"#;
        let b = ArtifactBinding::from_json(json).unwrap();
        assert_eq!(b.fragment_total, MAX_FRAGMENTS);
        assert_eq!(b.fragments.len(), MAX_FRAGMENTS as usize);
        assert_eq!(b.drift_for(FragmentIndex(3)), 0.05);
    }

    #[test]
    fn negative_drift_falls_back() {
        let b = ArtifactBinding {
            fragments: vec![FragmentBinding {
                index: FragmentIndex(0),
                drift: Some(-1.0),
            }],
            ..ArtifactBinding::new("a", 1)
        }
        .normalized()
        .unwrap();
        assert_eq!(b.drift_for(FragmentIndex(0)), DRIFT_BASE);
    }
}
