//! Shared fakes for unit tests

use crate::clock::TokioClock;
use crate::error::{Result, SparkwatchError};
use crate::heartbeat::MarkerSource;
use crate::spark::{ApplicationInfo, JobRecord, JobStatus, StatusSource};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::time::Instant;

type AppScript = Box<dyn Fn(Duration) -> Result<ApplicationInfo> + Send + Sync>;
type JobScript = Box<dyn Fn(Duration, &str) -> Result<Vec<JobRecord>> + Send + Sync>;

/// Status source whose answers depend on time elapsed since it was created
pub(crate) struct ScriptedStatus {
    started: Instant,
    app: AppScript,
    jobs: JobScript,
    app_calls: AtomicUsize,
    job_calls: AtomicUsize,
}

impl ScriptedStatus {
    pub(crate) fn new(
        app: impl Fn(Duration) -> Result<ApplicationInfo> + Send + Sync + 'static,
        jobs: impl Fn(Duration, &str) -> Result<Vec<JobRecord>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            started: Instant::now(),
            app: Box::new(app),
            jobs: Box::new(jobs),
            app_calls: AtomicUsize::new(0),
            job_calls: AtomicUsize::new(0),
        }
    }

    /// A healthy driver running `app-1` / `job-x` with the given jobs
    pub(crate) fn healthy(jobs: Vec<JobRecord>) -> Self {
        Self::new(
            |_| Ok(app("app-1", "job-x")),
            move |_, _| Ok(jobs.clone()),
        )
    }

    /// A driver that never answers
    pub(crate) fn unreachable() -> Self {
        Self::new(
            |_| Err(SparkwatchError::status("connection refused")),
            |_, _| Err(SparkwatchError::status("connection refused")),
        )
    }

    pub(crate) fn app_calls(&self) -> usize {
        self.app_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn job_calls(&self) -> usize {
        self.job_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSource for ScriptedStatus {
    async fn fetch_application_info(&self) -> Result<ApplicationInfo> {
        self.app_calls.fetch_add(1, Ordering::SeqCst);
        (self.app)(self.started.elapsed())
    }

    async fn fetch_job_list(&self, app_id: &str) -> Result<Vec<JobRecord>> {
        self.job_calls.fetch_add(1, Ordering::SeqCst);
        (self.jobs)(self.started.elapsed(), app_id)
    }
}

pub(crate) fn app(id: &str, name: &str) -> ApplicationInfo {
    ApplicationInfo {
        id: id.to_string(),
        name: name.to_string(),
        attempts: Vec::new(),
    }
}

pub(crate) fn job(job_id: i64, status: JobStatus, active: u64, completed: u64) -> JobRecord {
    JobRecord {
        job_id,
        name: format!("job {}", job_id),
        status,
        total_tasks: active + completed,
        active_tasks: active,
        completed_tasks: completed,
        failed_tasks: 0,
    }
}

/// Serve `router` on an ephemeral local port and return its base URL
pub(crate) async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

type Script = Box<dyn Fn(&TokioClock, Duration) -> Option<SystemTime> + Send + Sync>;

/// Marker whose modification time is a function of elapsed test time
pub(crate) struct ScriptedMarker {
    clock: TokioClock,
    path: PathBuf,
    script: Script,
}

impl ScriptedMarker {
    pub(crate) fn new(
        clock: TokioClock,
        script: impl Fn(&TokioClock, Duration) -> Option<SystemTime> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            clock,
            path: PathBuf::from("/test/main-container-terminated"),
            script: Box::new(script),
        })
    }

    /// Touched continuously until `last_beat`, then left alone
    pub(crate) fn beating_until(clock: TokioClock, last_beat: Duration) -> Arc<Self> {
        Self::new(clock, move |clock, elapsed| {
            Some(clock.at(elapsed.min(last_beat)))
        })
    }
}

#[async_trait]
impl MarkerSource for ScriptedMarker {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn last_modified(&self) -> io::Result<SystemTime> {
        (self.script)(&self.clock, self.clock.elapsed())
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "marker missing"))
    }
}
