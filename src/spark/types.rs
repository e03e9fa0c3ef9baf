use serde::{Deserialize, Serialize};

/// One attempt of a Spark application, as reported by `/api/v1/applications`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationAttempt {
    #[serde(default)]
    pub spark_user: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

/// The monitored Spark application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub attempts: Vec<ApplicationAttempt>,
}

impl ApplicationInfo {
    /// Spark lists attempts newest first
    pub fn latest_attempt(&self) -> Option<&ApplicationAttempt> {
        self.attempts.first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Running,
    Succeeded,
    Failed,
    #[serde(other)]
    Unknown,
}

/// One Spark job, as reported by `/api/v1/applications/{id}/jobs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(rename = "jobId")]
    pub job_id: i64,
    #[serde(default)]
    pub name: String,
    pub status: JobStatus,
    #[serde(rename = "numTasks", default)]
    pub total_tasks: u64,
    #[serde(rename = "numActiveTasks", default)]
    pub active_tasks: u64,
    #[serde(rename = "numCompletedTasks", default)]
    pub completed_tasks: u64,
    #[serde(rename = "numFailedTasks", default)]
    pub failed_tasks: u64,
}

/// Task and job counts aggregated over a job list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskSummary {
    pub jobs: usize,
    pub running_jobs: usize,
    pub succeeded_jobs: usize,
    pub failed_jobs: usize,
    pub total_tasks: u64,
    pub active_tasks: u64,
    pub completed_tasks: u64,
    pub failed_tasks: u64,
}

impl TaskSummary {
    pub fn from_jobs(jobs: &[JobRecord]) -> Self {
        jobs.iter().fold(Self::default(), |mut summary, job| {
            summary.jobs += 1;
            match job.status {
                JobStatus::Running => summary.running_jobs += 1,
                JobStatus::Succeeded => summary.succeeded_jobs += 1,
                JobStatus::Failed => summary.failed_jobs += 1,
                JobStatus::Unknown => {}
            }
            summary.total_tasks += job.total_tasks;
            summary.active_tasks += job.active_tasks;
            summary.completed_tasks += job.completed_tasks;
            summary.failed_tasks += job.failed_tasks;
            summary
        })
    }
}
