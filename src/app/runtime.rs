use super::orchestrator::HEARTBEAT;
use super::{ComponentState, Coordinator, RunSummary, ShutdownReason};
use crate::error::Result;
use crate::heartbeat::FlatlineOutcome;
use crate::monitor::NotificationState;
use crate::notify::NotifierStats;
use tokio::signal;
use tracing::{info, warn};

impl Coordinator {
    /// Run until the Spark driver flatlines or the token is cancelled.
    ///
    /// Fails only if the heartbeat never appears; once the monitors are up,
    /// every exit path drains the notification queue before returning.
    pub async fn run(&self) -> Result<RunSummary> {
        info!("Sparkwatch coordinator is running");

        let Some(running) = self.start().await? else {
            return Ok(RunSummary {
                reason: ShutdownReason::Cancelled,
                final_state: NotificationState::NotStarted,
                notifications: NotifierStats::default(),
                exit_code: 0,
            });
        };

        let reason = match self
            .watcher
            .watch_for_flatline(&self.cancellation_token)
            .await
        {
            FlatlineOutcome::Flatlined { last_heartbeat } => {
                ShutdownReason::Flatline { last_heartbeat }
            }
            FlatlineOutcome::Cancelled => ShutdownReason::Cancelled,
        };
        self.set_component_state(HEARTBEAT, ComponentState::Stopped)
            .await;

        Ok(self.shutdown(reason, running).await)
    }

    /// Cancel the shared token on SIGTERM or SIGINT
    pub fn install_signal_handlers(&self) {
        // Handle SIGTERM (pod termination) - Unix only
        #[cfg(unix)]
        {
            let token = self.cancellation_token.clone();
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::spawn(async move {
                        tokio::select! {
                            _ = sigterm.recv() => {
                                info!("Received SIGTERM signal");
                                token.cancel();
                            }
                            _ = token.cancelled() => {}
                        }
                    });
                }
                Err(e) => warn!("Failed to register SIGTERM handler: {}", e),
            }
        }

        // Handle SIGINT (Ctrl+C) - Cross-platform
        let token = self.cancellation_token.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = signal::ctrl_c() => {
                    if result.is_ok() {
                        info!("Received SIGINT signal (Ctrl+C)");
                        token.cancel();
                    }
                }
                _ = token.cancelled() => {}
            }
        });
    }
}
