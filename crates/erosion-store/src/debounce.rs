//! Trailing-debounce flush scheduling.
//!
//! Independent of any host timer primitive: the scheduler holds one pending
//! deadline. Hosts either poll [`FlushScheduler::take_due`] from their frame
//! loop or arm their own timer at [`FlushScheduler::deadline`]. Requests
//! within the window coalesce into one flush; [`FlushScheduler::force`]
//! short-circuits the wait on teardown.

/// Single pending-deadline debounce.
#[derive(Debug, Clone, PartialEq)]
pub struct FlushScheduler {
    delay_ms: f64,
    deadline: Option<f64>,
    coalesced: u32,
}

impl FlushScheduler {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms: if delay_ms.is_finite() { delay_ms.max(0.0) } else { 0.0 },
            deadline: None,
            coalesced: 0,
        }
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    /// Ask for a flush; re-arms the deadline to `now_ms + delay`.
    pub fn request(&mut self, now_ms: f64) {
        self.deadline = Some(now_ms + self.delay_ms);
        self.coalesced = self.coalesced.saturating_add(1);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the pending flush fires, if any.
    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }

    /// Requests folded into the pending flush so far.
    pub fn coalesced(&self) -> u32 {
        self.coalesced
    }

    /// `true` exactly once when the pending deadline has passed.
    pub fn take_due(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.clear();
                true
            }
            _ => false,
        }
    }

    /// Drop any pending deadline; the caller writes immediately.
    ///
    /// Returns whether a flush had been pending.
    pub fn force(&mut self) -> bool {
        let pending = self.is_pending();
        self.clear();
        pending
    }

    fn clear(&mut self) {
        self.deadline = None;
        self.coalesced = 0;
    }
}
