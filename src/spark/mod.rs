mod client;
mod types;


pub use client::SparkStatusClient;
pub use types::{ApplicationAttempt, ApplicationInfo, JobRecord, JobStatus, TaskSummary};

use crate::error::{Result, SparkwatchError};
use async_trait::async_trait;

/// Where the lifecycle monitor gets application and job status from
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// The single application running in this pod
    async fn fetch_application_info(&self) -> Result<ApplicationInfo>;

    /// All jobs of `app_id`, in whatever order the API returns them
    async fn fetch_job_list(&self, app_id: &str) -> Result<Vec<JobRecord>>;
}

/// Pick the one application out of an application listing.
///
/// A pod runs exactly one driver, so more than one record means we cannot
/// tell which job to follow and refuse to guess.
pub fn single_application(mut apps: Vec<ApplicationInfo>) -> Result<ApplicationInfo> {
    match apps.len() {
        0 => Err(SparkwatchError::NoApplication),
        1 => Ok(apps.remove(0)),
        count => Err(SparkwatchError::AmbiguousApplication { count }),
    }
}
