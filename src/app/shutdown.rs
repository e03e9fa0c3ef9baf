use super::orchestrator::{MONITOR, NOTIFIER};
use super::startup::RunningComponents;
use super::{ComponentState, Coordinator, RunSummary, ShutdownReason};
use crate::clock::format_timestamp;
use crate::monitor::NotificationState;
use crate::notify::NotifierStats;
use tracing::{error, info};

impl Coordinator {
    /// Stop the monitor, send the closing post and drain the notifier.
    ///
    /// The notifier handle is closed only after the monitor task has been
    /// joined, so nothing can send into a closed queue.
    pub(super) async fn shutdown(
        &self,
        reason: ShutdownReason,
        running: RunningComponents,
    ) -> RunSummary {
        match &reason {
            ShutdownReason::Flatline { last_heartbeat } => info!(
                "Shutdown initiated: Spark heartbeat flatlined (last beat {})",
                format_timestamp(*last_heartbeat)
            ),
            ShutdownReason::Cancelled => info!("Shutdown initiated: cancelled"),
        }

        // Stops the monitor loop if the watcher did not already
        self.cancellation_token.cancel();

        let RunningComponents {
            notifier,
            monitor,
            worker,
        } = running;

        self.set_component_state(MONITOR, ComponentState::Stopping)
            .await;
        let final_state = match monitor.await {
            Ok(state) => {
                self.set_component_state(MONITOR, ComponentState::Stopped)
                    .await;
                state
            }
            Err(e) => {
                error!("Lifecycle monitor task failed: {}", e);
                self.set_component_state(MONITOR, ComponentState::Failed)
                    .await;
                NotificationState::NotStarted
            }
        };

        if !self.final_message.is_empty() {
            if let Err(e) = notifier.send(self.final_message.clone()) {
                error!("Could not queue closing post: {}", e);
            }
        }

        self.set_component_state(NOTIFIER, ComponentState::Stopping)
            .await;
        notifier.close();

        let notifications = match worker.await {
            Ok(stats) => {
                self.set_component_state(NOTIFIER, ComponentState::Stopped)
                    .await;
                stats
            }
            Err(e) => {
                error!("Notification worker task failed: {}", e);
                self.set_component_state(NOTIFIER, ComponentState::Failed)
                    .await;
                NotifierStats::default()
            }
        };

        info!(
            "Shutdown complete in state {} ({} posts sent, {} failed)",
            final_state, notifications.sent, notifications.failed
        );

        RunSummary {
            reason,
            final_state,
            notifications,
            exit_code: 0,
        }
    }
}
