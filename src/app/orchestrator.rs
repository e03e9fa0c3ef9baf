use super::types::ComponentState;
use crate::config::{MonitorConfig, SinkKind, SparkwatchConfig};
use crate::error::Result;
use crate::heartbeat::HeartbeatWatcher;
use crate::notify::{sink_from_config, NotificationSink};
use crate::spark::{SparkStatusClient, StatusSource};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub(super) const HEARTBEAT: &str = "heartbeat";
pub(super) const MONITOR: &str = "monitor";
pub(super) const NOTIFIER: &str = "notifier";

/// Wires the heartbeat watcher, lifecycle monitor and notifier together
pub struct Coordinator {
    pub(super) watcher: HeartbeatWatcher,
    pub(super) source: Arc<dyn StatusSource>,
    pub(super) sink: Arc<dyn NotificationSink>,
    pub(super) monitor_config: MonitorConfig,
    pub(super) startup_timeout: Duration,
    pub(super) final_message: String,

    // Lifecycle management
    pub(super) component_states: Arc<Mutex<HashMap<&'static str, ComponentState>>>,
    pub(super) cancellation_token: CancellationToken,
}

impl Coordinator {
    /// Create a coordinator from already-built collaborators
    pub fn new(
        watcher: HeartbeatWatcher,
        source: Arc<dyn StatusSource>,
        sink: Arc<dyn NotificationSink>,
        config: &SparkwatchConfig,
    ) -> Self {
        Self {
            watcher,
            source,
            sink,
            monitor_config: config.monitor.clone(),
            startup_timeout: config.heartbeat.startup_timeout(),
            final_message: config.notify.final_message.clone(),
            component_states: Arc::new(Mutex::new(HashMap::new())),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Build the production collaborators described by `config`.
    ///
    /// Sink credentials are not checked here; [`Coordinator::run`] verifies
    /// them once the driver's heartbeat has appeared.
    pub fn from_config(config: &SparkwatchConfig) -> Result<Self> {
        let watcher = HeartbeatWatcher::from_config(&config.heartbeat);
        let source = Arc::new(SparkStatusClient::new(&config.spark)?);
        let sink = sink_from_config(&config.notify)?;

        if config.notify.sink == SinkKind::Log {
            info!("Log sink selected: posts will only be logged");
        }

        Ok(Self::new(watcher, source, sink, config))
    }

    /// Token shared by every poller; cancelling it starts shutdown
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }
}
