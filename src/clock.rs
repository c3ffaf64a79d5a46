//! Wall-clock and process uptime sources.
//!
//! The health probe never reads the system clock directly. It asks a [`Clock`]
//! so tests can pin both the timestamp and the uptime to known values.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Source of the current time and of the time elapsed since the process started.
pub trait Clock: Send + Sync {
    /// Current wall-clock time in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Time elapsed since the process started. Never decreases.
    fn uptime(&self) -> Duration;
}

/// Clock backed by the system time and a monotonic start instant.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    /// Create a clock whose uptime counts from now.
    ///
    /// Call this once at startup, before the server starts accepting requests.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::start()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn uptime(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Clock that always reports the same instant and uptime.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub now: DateTime<Utc>,
    pub uptime: Duration,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, uptime: Duration) -> Self {
        Self { now, uptime }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn uptime(&self) -> Duration {
        self.uptime
    }
}
