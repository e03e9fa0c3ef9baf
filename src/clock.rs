//! Wall-clock access for code that compares against file timestamps.
//!
//! Heartbeat staleness is judged against marker modification times, which are
//! wall-clock values, so the watcher reads "now" through [`Clock`] instead of
//! calling `SystemTime::now()` directly.

use std::time::{Duration, SystemTime};

/// Shortest period any poller ticks at
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// `period`, raised to [`MIN_POLL_INTERVAL`]. `tokio::time::interval` panics on zero.
pub fn poll_period(period: Duration) -> Duration {
    period.max(MIN_POLL_INTERVAL)
}

pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// The real system clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Wall clock that advances with tokio's timer, so paused-time tests can move it.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct TokioClock {
    origin: SystemTime,
    started: tokio::time::Instant,
}

#[cfg(test)]
impl TokioClock {
    pub(crate) fn new() -> Self {
        Self {
            origin: SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000),
            started: tokio::time::Instant::now(),
        }
    }

    /// Wall-clock time `offset` after this clock was created
    pub(crate) fn at(&self, offset: Duration) -> SystemTime {
        self.origin + offset
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
impl Clock for TokioClock {
    fn now(&self) -> SystemTime {
        self.origin + self.started.elapsed()
    }
}

/// Render a wall-clock timestamp as RFC 3339 for logs and posts
pub fn format_timestamp(time: SystemTime) -> String {
    chrono::DateTime::<chrono::Utc>::from(time).to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
