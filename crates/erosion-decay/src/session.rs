//! Per-session exposure accounting.
//!
//! Exposure carried over from earlier sessions is fixed at engine start; only
//! monotonic time elapsed since then is added. The wall-clock gap between
//! sessions never counts as exposure.

/// Anchors the current session on the monotonic clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionClock {
    base_elapsed_ms: f64,
    start_mono_ms: f64,
}

impl SessionClock {
    /// Start a session at `start_mono_ms` on top of `base_elapsed_ms` of prior exposure.
    pub fn start(base_elapsed_ms: f64, start_mono_ms: f64) -> Self {
        let base = if base_elapsed_ms.is_finite() { base_elapsed_ms.max(0.0) } else { 0.0 };
        let start = if start_mono_ms.is_finite() { start_mono_ms } else { 0.0 };
        Self {
            base_elapsed_ms: base,
            start_mono_ms: start,
        }
    }

    /// Exposure carried in from earlier sessions.
    pub fn base_elapsed_ms(&self) -> f64 {
        self.base_elapsed_ms
    }

    /// Time spent in this session as of `mono_now_ms`.
    pub fn session_elapsed_ms(&self, mono_now_ms: f64) -> f64 {
        let dt = mono_now_ms - self.start_mono_ms;
        if dt.is_finite() { dt.max(0.0) } else { 0.0 }
    }

    /// Total exposure: prior sessions plus this one.
    pub fn total_elapsed_now(&self, mono_now_ms: f64) -> f64 {
        self.base_elapsed_ms + self.session_elapsed_ms(mono_now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_starts_at_zero() {
        let c = SessionClock::start(0.0, 1_000.0);
        assert_eq!(c.total_elapsed_now(1_000.0), 0.0);
        assert_eq!(c.total_elapsed_now(1_250.0), 250.0);
    }

    #[test]
    fn carries_prior_exposure() {
        let c = SessionClock::start(4_000.0, 50.0);
        assert_eq!(c.total_elapsed_now(1_050.0), 5_000.0);
        assert_eq!(c.base_elapsed_ms(), 4_000.0);
    }

    #[test]
    fn earlier_monotonic_reading_adds_nothing() {
        let c = SessionClock::start(100.0, 500.0);
        assert_eq!(c.total_elapsed_now(10.0), 100.0);
    }

    #[test]
    fn bad_inputs_are_neutralized() {
        let c = SessionClock::start(f64::NAN, f64::INFINITY);
        assert_eq!(c.base_elapsed_ms(), 0.0);
        assert_eq!(c.total_elapsed_now(f64::NAN), 0.0);
        let c = SessionClock::start(-20.0, 0.0);
        assert_eq!(c.base_elapsed_ms(), 0.0);
    }
}
