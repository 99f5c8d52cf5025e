use std::time::Instant;

/// Monotonic milliseconds; unaffected by wall-clock changes.
pub(crate) trait Clock {
    fn now_ms(&self) -> u64;
}

pub(crate) struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub(crate) fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

pub(crate) fn format_seconds(ms: u64) -> String {
    format!("{:.2} s", ms as f64 / 1000.0)
}
