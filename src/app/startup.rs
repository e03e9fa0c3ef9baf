use super::orchestrator::{HEARTBEAT, MONITOR, NOTIFIER};
use super::{ComponentState, Coordinator};
use crate::error::Result;
use crate::monitor::{LifecycleMonitor, NotificationState};
use crate::notify::{Notifier, NotifierHandle, NotifierStats};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Background work started once the driver's heartbeat is up
pub(super) struct RunningComponents {
    pub(super) notifier: NotifierHandle,
    pub(super) monitor: JoinHandle<NotificationState>,
    pub(super) worker: JoinHandle<NotifierStats>,
}

impl Coordinator {
    /// Wait for the driver's heartbeat, then start the notifier and monitor.
    ///
    /// Returns `Ok(None)` if cancelled before the heartbeat showed up. A
    /// startup timeout or a failed sink check is returned as an error and
    /// nothing is started.
    pub(super) async fn start(&self) -> Result<Option<RunningComponents>> {
        self.set_component_state(HEARTBEAT, ComponentState::Starting)
            .await;

        let gate = tokio::select! {
            biased;
            _ = self.cancellation_token.cancelled() => None,
            result = self.watcher.await_startup(self.startup_timeout) => Some(result),
        };

        match gate {
            None => {
                info!("Cancelled while waiting for the Spark heartbeat");
                self.set_component_state(HEARTBEAT, ComponentState::Stopped)
                    .await;
                return Ok(None);
            }
            Some(Err(e)) => {
                error!("Spark never started: {}", e);
                self.set_component_state(HEARTBEAT, ComponentState::Failed)
                    .await;
                return Err(e);
            }
            Some(Ok(())) => {}
        }

        self.set_component_state(HEARTBEAT, ComponentState::Running)
            .await;

        self.set_component_state(NOTIFIER, ComponentState::Starting)
            .await;
        if let Err(e) = self.sink.verify().await {
            error!("Notification sink rejected its credentials: {}", e);
            self.set_component_state(NOTIFIER, ComponentState::Failed)
                .await;
            return Err(e);
        }
        let (notifier, worker) = Notifier::spawn(self.sink.clone());
        self.set_component_state(NOTIFIER, ComponentState::Running)
            .await;

        self.set_component_state(MONITOR, ComponentState::Starting)
            .await;
        let monitor = LifecycleMonitor::new(
            self.source.clone(),
            notifier.clone(),
            &self.monitor_config,
        );
        let monitor = tokio::spawn(monitor.run(self.cancellation_token.clone()));
        self.set_component_state(MONITOR, ComponentState::Running)
            .await;

        info!("Spark heartbeat found, monitors started");

        Ok(Some(RunningComponents {
            notifier,
            monitor,
            worker,
        }))
    }
}
