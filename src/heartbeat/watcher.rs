use super::marker::{FileMarker, MarkerSource};
use crate::clock::{format_timestamp, poll_period, Clock, SystemClock};
use crate::config::HeartbeatConfig;
use crate::error::{Result, SparkwatchError};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How a flatline watch ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatlineOutcome {
    /// The heartbeat went stale; the shared token has been cancelled
    Flatlined { last_heartbeat: SystemTime },
    /// Someone else cancelled the shared token first
    Cancelled,
}

/// Watches the heartbeat marker written by the Spark driver container
pub struct HeartbeatWatcher {
    marker: Arc<dyn MarkerSource>,
    clock: Arc<dyn Clock>,
    startup_poll: Duration,
    poll_interval: Duration,
    stale_threshold: Duration,
}

impl HeartbeatWatcher {
    /// Create a watcher with the default cadence (1s startup, 5s poll, 15s stale)
    pub fn new(marker: Arc<dyn MarkerSource>) -> Self {
        Self {
            marker,
            clock: Arc::new(SystemClock),
            startup_poll: Duration::from_secs(1),
            poll_interval: Duration::from_secs(5),
            stale_threshold: Duration::from_secs(15),
        }
    }

    /// Create a watcher for the marker file described by `config`
    pub fn from_config(config: &HeartbeatConfig) -> Self {
        Self::new(Arc::new(FileMarker::new(config.marker_path())))
            .with_startup_poll(config.startup_poll())
            .with_poll_interval(config.poll_interval())
            .with_stale_threshold(config.stale_threshold())
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Periods below [`crate::clock::MIN_POLL_INTERVAL`] are raised to it
    pub fn with_startup_poll(mut self, startup_poll: Duration) -> Self {
        self.startup_poll = poll_period(startup_poll);
        self
    }

    /// Periods below [`crate::clock::MIN_POLL_INTERVAL`] are raised to it
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_period(poll_interval);
        self
    }

    pub fn with_stale_threshold(mut self, stale_threshold: Duration) -> Self {
        self.stale_threshold = stale_threshold;
        self
    }

    /// Wait for the marker to appear, checking once per startup poll.
    ///
    /// Fails with [`SparkwatchError::StartupTimeout`] if it is still missing
    /// once `timeout` has elapsed.
    pub async fn await_startup(&self, timeout: Duration) -> Result<()> {
        info!(
            "Waiting {}s for Spark heartbeat at '{}'",
            timeout.as_secs(),
            self.marker.path().display()
        );

        let started = Instant::now();
        let mut ticker = interval(self.startup_poll);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match self.marker.last_modified().await {
                Ok(modified) => {
                    info!(
                        "Heartbeat marker found after {:?} (last modified {})",
                        started.elapsed(),
                        format_timestamp(modified)
                    );
                    return Ok(());
                }
                Err(e) => debug!("Heartbeat marker not present yet: {}", e),
            }

            let waited = started.elapsed();
            if waited >= timeout {
                return Err(SparkwatchError::StartupTimeout {
                    path: self.marker.path().to_path_buf(),
                    waited,
                });
            }
        }
    }

    /// Poll the marker until its last observed update is older than the stale
    /// threshold, then cancel `cancel`.
    ///
    /// A marker that cannot be read keeps the last known heartbeat: the driver
    /// deletes the file on exit, so absence alone says nothing about time.
    pub async fn watch_for_flatline(&self, cancel: &CancellationToken) -> FlatlineOutcome {
        let mut last_heartbeat = self.clock.now();
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(
            "Watching heartbeat every {:?}, stale after {:?}",
            self.poll_interval, self.stale_threshold
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Heartbeat watch cancelled");
                    return FlatlineOutcome::Cancelled;
                }
                _ = ticker.tick() => {}
            }

            match self.marker.last_modified().await {
                Ok(modified) if modified > last_heartbeat => last_heartbeat = modified,
                Ok(_) => {}
                Err(e) => debug!("Heartbeat marker unreadable, keeping last heartbeat: {}", e),
            }

            let age = self
                .clock
                .now()
                .duration_since(last_heartbeat)
                .unwrap_or(Duration::ZERO);

            if age >= self.stale_threshold {
                warn!(
                    "Spark heartbeat flatlined: last beat at {} ({}s ago)",
                    format_timestamp(last_heartbeat),
                    age.as_secs()
                );
                cancel.cancel();
                return FlatlineOutcome::Flatlined { last_heartbeat };
            }
        }
    }
}
