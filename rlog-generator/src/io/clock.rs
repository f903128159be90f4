//! Time source for paced generation.

use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

/// Monotonic time, wall-clock time and sleeping, swappable in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn local_now(&self) -> DateTime<Local>;
    fn sleep(&self, duration: Duration);

    /// Sleep until `deadline`; returns immediately if it already passed.
    fn sleep_until(&self, deadline: Instant) {
        if let Some(remaining) = deadline.checked_duration_since(self.now())
            && !remaining.is_zero()
        {
            self.sleep(remaining);
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn local_now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}
