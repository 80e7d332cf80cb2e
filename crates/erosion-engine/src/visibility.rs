//! Duration-gated reveals.
//!
//! Each target accumulates on-screen time from enter/exit transitions. Once
//! the accumulated time reaches its (capped) delay the target is revealed,
//! and stays revealed. Erosion plays no part here.

use std::collections::BTreeMap;

use erosion_core::config::VisibilityConfig;
use erosion_core::types::TargetId;
use tracing::debug;

/// Where visibility transitions come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObservationMode {
    /// The host reports enter/exit transitions.
    #[default]
    Observed,
    /// No observation capability: every target counts as visible from registration.
    AlwaysVisible,
}

#[derive(Debug, Clone, PartialEq)]
struct TargetState {
    delay_ms: f64,
    accumulated_ms: f64,
    visible_since: Option<f64>,
    revealed: bool,
}

impl TargetState {
    fn visible_ms(&self, mono_now_ms: f64) -> f64 {
        let open = self
            .visible_since
            .map_or(0.0, |since| (mono_now_ms - since).max(0.0));
        self.accumulated_ms + open
    }
}

#[derive(Debug, Clone)]
pub struct VisibilityTracker {
    config: VisibilityConfig,
    mode: ObservationMode,
    targets: BTreeMap<TargetId, TargetState>,
}

impl VisibilityTracker {
    pub fn new(config: VisibilityConfig, mode: ObservationMode) -> Self {
        Self {
            config,
            mode,
            targets: BTreeMap::new(),
        }
    }

    pub fn mode(&self) -> ObservationMode {
        self.mode
    }

    /// Track `id` with a reveal-delay hint. Re-registering keeps existing progress.
    pub fn register(&mut self, id: TargetId, delay_hint_ms: f64, mono_now_ms: f64) {
        let delay_ms = self.config.effective_delay(delay_hint_ms);
        let always = self.mode == ObservationMode::AlwaysVisible;
        let entry = self.targets.entry(id).or_insert_with(|| TargetState {
            delay_ms,
            accumulated_ms: 0.0,
            visible_since: always.then_some(mono_now_ms),
            revealed: false,
        });
        entry.delay_ms = delay_ms;
    }

    /// Record an enter (`visible = true`) or exit transition for `id`.
    ///
    /// Ignored for unknown targets and in [`ObservationMode::AlwaysVisible`].
    pub fn set_visible(&mut self, id: &TargetId, visible: bool, mono_now_ms: f64) {
        if self.mode == ObservationMode::AlwaysVisible || !mono_now_ms.is_finite() {
            return;
        }
        let Some(target) = self.targets.get_mut(id) else {
            debug!(target_id = %id, "visibility change for unregistered target");
            return;
        };
        match (visible, target.visible_since) {
            (true, None) => target.visible_since = Some(mono_now_ms),
            (false, Some(since)) => {
                target.accumulated_ms += (mono_now_ms - since).max(0.0);
                target.visible_since = None;
            }
            // Repeated enter or exit.
            _ => {}
        }
    }

    /// Advance reveals; returns the targets revealed by this call.
    pub fn tick(&mut self, mono_now_ms: f64) -> Vec<TargetId> {
        let mut newly = Vec::new();
        for (id, target) in &mut self.targets {
            if !target.revealed && target.visible_ms(mono_now_ms) >= target.delay_ms {
                target.revealed = true;
                newly.push(id.clone());
            }
        }
        if !newly.is_empty() {
            debug!(count = newly.len(), "targets revealed");
        }
        newly
    }

    /// Accumulated visible time for `id`, including any open interval.
    pub fn visible_ms(&self, id: &TargetId, mono_now_ms: f64) -> Option<f64> {
        self.targets.get(id).map(|t| t.visible_ms(mono_now_ms))
    }

    pub fn delay_ms(&self, id: &TargetId) -> Option<f64> {
        self.targets.get(id).map(|t| t.delay_ms)
    }

    pub fn is_revealed(&self, id: &TargetId) -> bool {
        self.targets.get(id).is_some_and(|t| t.revealed)
    }

    /// All revealed targets so far.
    pub fn revealed(&self) -> impl Iterator<Item = &TargetId> {
        self.targets
            .iter()
            .filter(|(_, t)| t.revealed)
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn id(s: &str) -> TargetId {
        TargetId(s.to_string())
    }

    fn observed() -> VisibilityTracker {
        VisibilityTracker::new(VisibilityConfig::default(), ObservationMode::Observed)
    }

    #[test]
    fn reveals_after_accumulated_visibility() {
        let mut v = observed();
        v.register(id("statement"), 1_000.0, 0.0);
        v.set_visible(&id("statement"), true, 100.0);
        assert!(v.tick(700.0).is_empty());
        v.set_visible(&id("statement"), false, 700.0);
        // Off-screen time does not count.
        assert!(v.tick(5_000.0).is_empty());
        v.set_visible(&id("statement"), true, 5_000.0);
        assert!(v.tick(5_399.0).is_empty());
        assert_eq!(v.tick(5_400.0), vec![id("statement")]);
    }

    #[test]
    fn reveal_is_sticky_and_reported_once() {
        let mut v = observed();
        v.register(id("a"), 0.0, 0.0);
        assert_eq!(v.tick(0.0), vec![id("a")]);
        v.set_visible(&id("a"), false, 10.0);
        assert!(v.tick(20.0).is_empty());
        assert!(v.is_revealed(&id("a")));
    }

    #[test]
    fn delay_is_capped() {
        let mut v = observed();
        v.register(id("slow"), 120_000.0, 0.0);
        assert_eq!(v.delay_ms(&id("slow")), Some(30_000.0));
        v.set_visible(&id("slow"), true, 0.0);
        assert_eq!(v.tick(30_000.0), vec![id("slow")]);
    }

    #[test]
    fn always_visible_mode_counts_from_registration() {
        let mut v = VisibilityTracker::new(VisibilityConfig::default(), ObservationMode::AlwaysVisible);
        v.register(id("a"), 500.0, 1_000.0);
        // Exit transitions are ignored without an observer.
        v.set_visible(&id("a"), false, 1_100.0);
        assert!(v.tick(1_499.0).is_empty());
        assert_eq!(v.tick(1_500.0), vec![id("a")]);
    }

    #[test]
    fn repeated_enter_keeps_first_timestamp() {
        let mut v = observed();
        v.register(id("a"), 10_000.0, 0.0);
        v.set_visible(&id("a"), true, 0.0);
        v.set_visible(&id("a"), true, 4_000.0);
        assert_eq!(v.visible_ms(&id("a"), 5_000.0), Some(5_000.0));
    }

    #[test]
    fn unknown_target_is_ignored() {
        let mut v = observed();
        v.set_visible(&id("ghost"), true, 0.0);
        assert!(v.tick(1e9).is_empty());
        assert_eq!(v.visible_ms(&id("ghost"), 0.0), None);
    }

    proptest! {
        #[test]
        fn never_unrevealed(
            delay in 0.0f64..40_000.0,
            steps in proptest::collection::vec((any::<bool>(), 0.0f64..5_000.0), 1..40),
        ) {
            let mut v = observed();
            v.register(id("t"), delay, 0.0);
            let mut now = 0.0;
            let mut seen = false;
            for (visible, dt) in steps {
                now += dt;
                v.set_visible(&id("t"), visible, now);
                v.tick(now);
                if seen {
                    prop_assert!(v.is_revealed(&id("t")));
                }
                seen = v.is_revealed(&id("t"));
            }
        }
    }
}
