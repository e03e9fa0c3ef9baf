use super::*;
use crate::clock::TokioClock;
use crate::config::SparkwatchConfig;
use crate::error::SparkwatchError;
use crate::heartbeat::HeartbeatWatcher;
use crate::monitor::NotificationState;
use crate::notify::{MessageId, RecordingSink};
use crate::spark::JobStatus;
use crate::test_support::{job, ScriptedMarker, ScriptedStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

struct Fixture {
    coordinator: Coordinator,
    source: Arc<ScriptedStatus>,
    sink: Arc<RecordingSink>,
    started: Instant,
}

impl Fixture {
    fn new(marker: Arc<ScriptedMarker>, clock: TokioClock, config: SparkwatchConfig) -> Self {
        let source = Arc::new(ScriptedStatus::healthy(vec![
            job(1, JobStatus::Running, 3, 0),
            job(2, JobStatus::Succeeded, 0, 4),
        ]));
        let sink = Arc::new(RecordingSink::new());
        let watcher = HeartbeatWatcher::new(marker).with_clock(Arc::new(clock));
        let coordinator = Coordinator::new(watcher, source.clone(), sink.clone(), &config);

        Self {
            coordinator,
            source,
            sink,
            started: Instant::now(),
        }
    }

    fn beating_until(last_beat: u64) -> Self {
        let clock = TokioClock::new();
        let marker = ScriptedMarker::beating_until(clock, Duration::from_secs(last_beat));
        Self::new(marker, clock, SparkwatchConfig::default())
    }

    fn offset(&self, at: Instant) -> Duration {
        at - self.started
    }
}

#[tokio::test(start_paused = true)]
async fn test_full_run_announces_progress_and_closes_thread() {
    let fixture = Fixture::beating_until(100);

    let summary = fixture.coordinator.run().await.unwrap();

    assert_eq!(
        summary.reason,
        ShutdownReason::Flatline {
            last_heartbeat: TokioClock::new().at(Duration::from_secs(100))
        }
    );
    assert_eq!(summary.exit_code, 0);
    assert_eq!(summary.final_state, NotificationState::Progress(1));
    assert_eq!(summary.notifications.sent, 3);
    assert_eq!(summary.notifications.failed, 0);

    let posts = fixture.sink.posts();
    assert_eq!(posts.len(), 3);

    assert!(posts[0].text.contains("job-x"));
    assert!(posts[0].text.contains("ID: app-1"));
    assert_eq!(posts[0].in_reply_to, None);
    assert_eq!(fixture.offset(posts[0].at), Duration::ZERO);

    assert!(posts[1].text.contains("3 active / 4 completed"));
    assert_eq!(posts[1].in_reply_to, Some(MessageId::from("post-1")));
    assert_eq!(fixture.offset(posts[1].at), Duration::from_secs(60));

    assert_eq!(posts[2].text, "We're all done! 👋");
    assert_eq!(posts[2].in_reply_to, Some(MessageId::from("post-2")));
    let closed_at = fixture.offset(posts[2].at);
    assert!(closed_at >= Duration::from_secs(115), "closed at {:?}", closed_at);
    assert!(closed_at < Duration::from_secs(120), "closed at {:?}", closed_at);

    assert_eq!(fixture.source.job_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_startup_timeout_fails_without_polling_or_posting() {
    let clock = TokioClock::new();
    let marker = ScriptedMarker::new(clock, |_, _| None);
    let fixture = Fixture::new(marker, clock, SparkwatchConfig::default());

    let result = fixture.coordinator.run().await;

    match result {
        Err(e @ SparkwatchError::StartupTimeout { .. }) => assert!(e.is_fatal()),
        other => panic!("Expected startup timeout, got {:?}", other),
    }
    assert_eq!(fixture.source.app_calls(), 0);
    assert!(fixture.sink.attempts().is_empty());
    assert_eq!(
        fixture.coordinator.get_component_state("heartbeat").await,
        Some(ComponentState::Failed)
    );
}

#[tokio::test(start_paused = true)]
async fn test_external_cancel_still_sends_closing_post() {
    let fixture = Fixture::beating_until(10_000);
    let token = fixture.coordinator.cancellation_token();

    tokio::spawn(async move {
        sleep(Duration::from_secs(32)).await;
        token.cancel();
    });

    let summary = fixture.coordinator.run().await.unwrap();

    assert_eq!(summary.reason, ShutdownReason::Cancelled);
    assert_eq!(summary.final_state, NotificationState::Started);

    let posts = fixture.sink.posts();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[1].text, "We're all done! 👋");
    assert_eq!(posts[1].in_reply_to, Some(MessageId::from("post-1")));
    assert_eq!(fixture.offset(posts[1].at), Duration::from_secs(32));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_before_startup_skips_everything() {
    let fixture = Fixture::beating_until(100);
    fixture.coordinator.cancellation_token().cancel();

    let summary = fixture.coordinator.run().await.unwrap();

    assert_eq!(summary.reason, ShutdownReason::Cancelled);
    assert_eq!(summary.final_state, NotificationState::NotStarted);
    assert_eq!(summary.exit_code, 0);
    assert_eq!(fixture.source.app_calls(), 0);
    assert!(fixture.sink.attempts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_empty_final_message_skips_closing_post() {
    let clock = TokioClock::new();
    let marker = ScriptedMarker::beating_until(clock, Duration::from_secs(100));
    let mut config = SparkwatchConfig::default();
    config.notify.final_message = String::new();
    let fixture = Fixture::new(marker, clock, config);

    let summary = fixture.coordinator.run().await.unwrap();

    assert!(matches!(summary.reason, ShutdownReason::Flatline { .. }));
    let posts = fixture.sink.posts();
    assert_eq!(posts.len(), 2);
    assert!(posts[1].text.contains("still chugging"));
}

#[tokio::test(start_paused = true)]
async fn test_flatline_before_first_milestone() {
    let fixture = Fixture::beating_until(10);

    let summary = fixture.coordinator.run().await.unwrap();

    assert_eq!(summary.final_state, NotificationState::Started);
    assert_eq!(fixture.source.job_calls(), 0);

    let posts = fixture.sink.posts();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[1].text, "We're all done! 👋");
    assert_eq!(posts[1].in_reply_to, Some(MessageId::from("post-1")));
    assert_eq!(fixture.offset(posts[1].at), Duration::from_secs(25));
}

#[tokio::test(start_paused = true)]
async fn test_components_end_stopped() {
    let fixture = Fixture::beating_until(10);

    fixture.coordinator.run().await.unwrap();

    let states = fixture.coordinator.get_all_component_states().await;
    assert_eq!(states.len(), 3);
    assert!(states.values().all(|state| *state == ComponentState::Stopped));
}

#[tokio::test(start_paused = true)]
async fn test_failed_closing_post_is_counted() {
    let fixture = Fixture::beating_until(10);
    let sink = fixture.sink.clone();

    // Let the start post through, then fail the closing one
    tokio::spawn(async move {
        sleep(Duration::from_secs(20)).await;
        sink.fail_next(1);
    });

    let summary = fixture.coordinator.run().await.unwrap();

    assert_eq!(summary.exit_code, 0);
    assert_eq!(summary.notifications.sent, 1);
    assert_eq!(summary.notifications.failed, 1);
    assert_eq!(fixture.sink.attempts().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_sink_credentials_are_checked_after_heartbeat_appears() {
    let clock = TokioClock::new();
    let marker = ScriptedMarker::new(clock, |clock, elapsed| {
        (elapsed >= Duration::from_secs(3)).then(|| clock.at(elapsed))
    });
    let fixture = Fixture::new(marker, clock, SparkwatchConfig::default());
    fixture.sink.reject_credentials();

    let result = fixture.coordinator.run().await;

    assert!(matches!(result, Err(SparkwatchError::Post { .. })));
    assert_eq!(clock.elapsed(), Duration::from_secs(3));
    assert_eq!(fixture.sink.verifications(), 1);
    assert!(fixture.sink.attempts().is_empty());
    assert_eq!(fixture.source.app_calls(), 0);
    assert_eq!(
        fixture.coordinator.get_component_state("heartbeat").await,
        Some(ComponentState::Running)
    );
    assert_eq!(
        fixture.coordinator.get_component_state("notifier").await,
        Some(ComponentState::Failed)
    );
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_startup_never_checks_credentials() {
    let clock = TokioClock::new();
    let marker = ScriptedMarker::new(clock, |_, _| None);
    let fixture = Fixture::new(marker, clock, SparkwatchConfig::default());

    assert!(fixture.coordinator.run().await.is_err());
    assert_eq!(fixture.sink.verifications(), 0);
}

#[test]
fn test_from_config_builds_sinks_through_factory_without_network() {
    let mut config = SparkwatchConfig::default();
    config.notify.endpoint = "http://127.0.0.1:9".to_string();
    assert!(Coordinator::from_config(&config).is_err());

    config.notify.consumer_key = Some("consumer-key".to_string());
    config.notify.consumer_secret = Some("consumer-secret".to_string());
    config.notify.access_token = Some("access-token".to_string());
    config.notify.access_token_secret = Some("access-secret".to_string());
    assert!(Coordinator::from_config(&config).is_ok());

    config.notify.sink = crate::config::SinkKind::Log;
    assert!(Coordinator::from_config(&config).is_ok());
}
