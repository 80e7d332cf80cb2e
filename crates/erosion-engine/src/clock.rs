//! Host clock built on `web-time`, so the same code reads `performance.now()`
//! and `Date.now()` on wasm32 and the system clocks natively.

use erosion_core::traits::Clock;
use erosion_core::types::Timestamp;
use web_time::{Instant, SystemTime, UNIX_EPOCH};

/// Wall-clock milliseconds since the epoch, paired with monotonic milliseconds
/// since this clock was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let wall_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1_000.0)
            .unwrap_or(0.0);
        let mono_ms = self.origin.elapsed().as_secs_f64() * 1_000.0;
        Timestamp::new(wall_ms, mono_ms)
    }
}
