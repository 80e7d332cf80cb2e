//! Per-fragment erosion windows.
//!
//! Each fragment owns a window `[start, start + span)` of the global erosion
//! score, derived from its seed:
//! - `start = seed * start_range`, so windows open in the lower part of the
//!   score range (some fragments begin eroding almost immediately),
//! - `span` narrows linearly from `span_max` to `span_min` as the seed grows,
//!   so late fragments hold out and then go quickly.
//!
//! Within its window a fragment eases along a smoothstep rather than a linear
//! ramp. Below the window it is exactly intact, above it exactly erased.

use erosion_core::config::PlannerConfig;
use erosion_core::constants::MAX_FRAGMENTS;
use erosion_core::seed::seed;
use erosion_core::types::{FragmentIndex, FragmentPlan};
use serde::Serialize;
use tracing::debug;

use crate::curve::smoothstep;

/// Local erosion of one fragment for the current global score.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FragmentErosion {
    pub fragment_index: FragmentIndex,
    /// Continuous value in `[0, 1]` for gradual visual transition.
    pub erosion: f64,
    /// Reached 1 within the configured epsilon; the render layer hides it.
    pub erased: bool,
}

/// Derives [`FragmentPlan`]s and evaluates them against a global score.
#[derive(Debug, Clone, Default)]
pub struct FragmentPlanner {
    config: PlannerConfig,
}

impl FragmentPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Window for one fragment. Pure in `(artifact_id, index)`.
    pub fn plan(&self, artifact_id: &str, index: FragmentIndex) -> FragmentPlan {
        let s = seed(artifact_id, index.0);
        let start = s * self.config.start_range;
        let span = self.config.span_max - (self.config.span_max - self.config.span_min) * s;
        FragmentPlan {
            fragment_index: index,
            erosion_window_start: start,
            erosion_window_span: span,
        }
    }

    /// Windows for fragments `0..total`, computed once per page load.
    /// `total` is capped at [`MAX_FRAGMENTS`].
    pub fn plan_all(&self, artifact_id: &str, total: u32) -> Vec<FragmentPlan> {
        let total = total.min(MAX_FRAGMENTS);
        let plans: Vec<FragmentPlan> = (0..total)
            .map(|i| self.plan(artifact_id, FragmentIndex(i)))
            .collect();
        debug!(artifact = artifact_id, fragments = total, "planned erosion windows");
        plans
    }

    /// Local erosion in `[0, 1]` for `score`.
    ///
    /// Exactly 0 for `score <= start`, exactly 1 for `score >= start + span`.
    pub fn local_erosion(plan: &FragmentPlan, score: f64) -> f64 {
        if score.is_nan() || score <= plan.erosion_window_start {
            return 0.0;
        }
        if score >= plan.window_end() {
            return 1.0;
        }
        smoothstep((score - plan.erosion_window_start) / plan.erosion_window_span)
    }

    /// Whether a local erosion value counts as fully erased.
    pub fn is_erased(&self, erosion: f64) -> bool {
        erosion >= 1.0 - self.config.erased_epsilon
    }

    /// Evaluate every plan against one global score.
    pub fn erode(&self, plans: &[FragmentPlan], score: f64) -> Vec<FragmentErosion> {
        plans
            .iter()
            .map(|plan| {
                let erosion = Self::local_erosion(plan, score);
                FragmentErosion {
                    fragment_index: plan.fragment_index,
                    erosion,
                    erased: self.is_erased(erosion),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ARTIFACT: &str = "artifact123abc";

    fn planner() -> FragmentPlanner {
        FragmentPlanner::default()
    }

    #[test]
    fn plan_all_caps_fragment_count() {
        let plans = planner().plan_all(ARTIFACT, u32::MAX);
        assert_eq!(plans.len(), MAX_FRAGMENTS as usize);
        assert_eq!(
            plans.last().map(|p| p.fragment_index),
            Some(FragmentIndex(MAX_FRAGMENTS - 1))
        );
    }

    fn fixed_plan(start: f64, span: f64) -> FragmentPlan {
        FragmentPlan {
            fragment_index: FragmentIndex(0),
            erosion_window_start: start,
            erosion_window_span: span,
        }
    }

    #[test]
    fn plans_are_deterministic() {
        let a = planner().plan_all(ARTIFACT, 12);
        let b = FragmentPlanner::default().plan_all(ARTIFACT, 12);
        assert_eq!(a, b);
    }

    #[test]
    fn plan_all_indexes_in_order() {
        let plans = planner().plan_all(ARTIFACT, 5);
        let idx: Vec<u32> = plans.iter().map(|p| p.fragment_index.0).collect();
        assert_eq!(idx, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn zero_fragments_yield_no_plans() {
        assert!(planner().plan_all(ARTIFACT, 0).is_empty());
    }

    #[test]
    fn starts_within_lower_range() {
        for p in planner().plan_all(ARTIFACT, 200) {
            assert!(p.erosion_window_start >= 0.0);
            assert!(p.erosion_window_start < 0.8);
        }
    }

    #[test]
    fn higher_seed_means_later_start_and_narrower_span() {
        let plans = planner().plan_all(ARTIFACT, 64);
        let mut sorted = plans.clone();
        sorted.sort_by(|a, b| a.erosion_window_start.total_cmp(&b.erosion_window_start));
        for pair in sorted.windows(2) {
            assert!(pair[0].erosion_window_span >= pair[1].erosion_window_span);
        }
    }

    #[test]
    fn every_window_closes_by_full_score() {
        for p in planner().plan_all(ARTIFACT, 200) {
            assert!(p.window_end() <= 1.0, "window end {}", p.window_end());
        }
    }

    #[test]
    fn local_erosion_below_window_is_zero() {
        let p = fixed_plan(0.4, 0.2);
        assert_eq!(FragmentPlanner::local_erosion(&p, 0.0), 0.0);
        assert_eq!(FragmentPlanner::local_erosion(&p, 0.4), 0.0);
    }

    #[test]
    fn local_erosion_above_window_is_one() {
        let p = fixed_plan(0.4, 0.2);
        assert_eq!(FragmentPlanner::local_erosion(&p, 0.6), 1.0);
        assert_eq!(FragmentPlanner::local_erosion(&p, 1.0), 1.0);
    }

    #[test]
    fn local_erosion_midpoint_is_half() {
        let p = fixed_plan(0.2, 0.4);
        let v = FragmentPlanner::local_erosion(&p, 0.4);
        assert!((v - 0.5).abs() < 1e-12);
    }

    #[test]
    fn local_erosion_nan_score_is_intact() {
        let p = fixed_plan(0.0, 0.3);
        assert_eq!(FragmentPlanner::local_erosion(&p, f64::NAN), 0.0);
    }

    #[test]
    fn erased_uses_epsilon() {
        let pl = planner();
        assert!(pl.is_erased(1.0));
        assert!(pl.is_erased(0.9995));
        assert!(!pl.is_erased(0.99));
    }

    #[test]
    fn erode_marks_erased_fragments() {
        let pl = planner();
        let plans = vec![fixed_plan(0.1, 0.2), fixed_plan(0.7, 0.2)];
        let out = pl.erode(&plans, 0.5);
        assert!(out[0].erased);
        assert_eq!(out[0].erosion, 1.0);
        assert!(!out[1].erased);
        assert_eq!(out[1].erosion, 0.0);
    }

    proptest! {
        #[test]
        fn local_erosion_bounded_and_monotonic(
            idx in 0u32..500,
            a in 0.0f64..1.0,
            b in 0.0f64..1.0,
        ) {
            let plan = planner().plan(ARTIFACT, FragmentIndex(idx));
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let vlo = FragmentPlanner::local_erosion(&plan, lo);
            let vhi = FragmentPlanner::local_erosion(&plan, hi);
            prop_assert!((0.0..=1.0).contains(&vlo));
            prop_assert!(vlo <= vhi);
        }

        #[test]
        fn fully_eroded_only_past_window(idx in 0u32..500, score in 0.0f64..1.0) {
            let plan = planner().plan(ARTIFACT, FragmentIndex(idx));
            let v = FragmentPlanner::local_erosion(&plan, score);
            if score < plan.erosion_window_start {
                prop_assert_eq!(v, 0.0);
            }
            if v == 1.0 {
                prop_assert!(score >= plan.window_end() - 1e-6);
            }
            if score >= plan.window_end() {
                prop_assert_eq!(v, 1.0);
            }
        }
    }
}
