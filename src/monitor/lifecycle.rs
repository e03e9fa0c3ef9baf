use super::milestone::{progress_message, start_message, MilestonePlan, NotificationState};
use crate::clock::poll_period;
use crate::config::MonitorConfig;
use crate::notify::NotifierHandle;
use crate::spark::{StatusSource, TaskSummary};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Polls the Spark status API and announces lifecycle milestones.
///
/// The notification state lives inside [`LifecycleMonitor::run`] and is
/// handed back when the run ends; nothing else reads or writes it.
pub struct LifecycleMonitor {
    source: Arc<dyn StatusSource>,
    notifier: NotifierHandle,
    poll_interval: Duration,
    plan: MilestonePlan,
    greeting: String,
}

impl LifecycleMonitor {
    pub fn new(
        source: Arc<dyn StatusSource>,
        notifier: NotifierHandle,
        config: &MonitorConfig,
    ) -> Self {
        Self {
            source,
            notifier,
            poll_interval: poll_period(config.poll_interval()),
            plan: MilestonePlan::new(config.milestone_offsets()),
            greeting: config.greeting.clone(),
        }
    }

    /// Poll until `cancel` fires and return the last state reached.
    ///
    /// The first poll happens immediately so a job that is already up gets
    /// announced without waiting a full interval.
    pub async fn run(self, cancel: CancellationToken) -> NotificationState {
        info!(
            "Spark API monitor started (poll every {:?}, {} progress milestones)",
            self.poll_interval,
            self.plan.len()
        );

        let started = Instant::now();
        let mut state = NotificationState::NotStarted;
        let mut app_id: Option<String> = None;

        if !cancel.is_cancelled() {
            state = self.poll(state, started.elapsed(), &mut app_id, &cancel).await;
        }

        let mut ticker = interval_at(started + self.poll_interval, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            debug!("Spark API monitor checking in ({})", state);
            state = self.poll(state, started.elapsed(), &mut app_id, &cancel).await;
        }

        info!("Spark API monitor stopped in state {}", state);
        state
    }

    async fn poll(
        &self,
        state: NotificationState,
        elapsed: Duration,
        app_id: &mut Option<String>,
        cancel: &CancellationToken,
    ) -> NotificationState {
        if self.plan.is_complete(state) {
            return state;
        }

        let app = match self.source.fetch_application_info().await {
            Ok(app) => app,
            Err(e) => {
                warn!("Couldn't fetch Spark info: {}", e);
                return state;
            }
        };

        if let Some(previous) = app_id.as_deref() {
            if previous != app.id {
                warn!("Spark application changed from {} to {}", previous, app.id);
            }
        }
        *app_id = Some(app.id.clone());

        if state == NotificationState::NotStarted {
            if cancel.is_cancelled() {
                return state;
            }
            info!("Spark application {} ({}) is up", app.name, app.id);
            self.emit(start_message(&self.greeting, &app));
            return NotificationState::Started;
        }

        let Some((next, offset)) = self.plan.due(state, elapsed) else {
            return state;
        };

        match self.source.fetch_job_list(&app.id).await {
            Ok(jobs) => {
                if cancel.is_cancelled() {
                    return state;
                }
                let summary = TaskSummary::from_jobs(&jobs);
                info!(
                    "{} reached: {} jobs, {} active / {} completed / {} total tasks",
                    next,
                    summary.jobs,
                    summary.active_tasks,
                    summary.completed_tasks,
                    summary.total_tasks
                );
                self.emit(progress_message(offset, &summary));
                next
            }
            Err(e) => {
                warn!("Couldn't fetch Spark jobs for {}: {}", app.id, e);
                state
            }
        }
    }

    fn emit(&self, text: String) {
        if let Err(e) = self.notifier.send(text) {
            error!("Dropping update: {}", e);
        }
    }
}
