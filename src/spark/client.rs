use super::types::{ApplicationInfo, JobRecord};
use super::{single_application, StatusSource};
use crate::config::SparkConfig;
use crate::error::{Result, SparkwatchError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Client for the Spark driver's monitoring REST API
#[derive(Debug, Clone)]
pub struct SparkStatusClient {
    http: reqwest::Client,
    base_url: String,
}

impl SparkStatusClient {
    pub fn new(config: &SparkConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SparkwatchError::status(format!(
                "GET {} returned {}",
                url, status
            )));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl StatusSource for SparkStatusClient {
    async fn fetch_application_info(&self) -> Result<ApplicationInfo> {
        let apps: Vec<ApplicationInfo> = self.get_json("/api/v1/applications").await?;
        single_application(apps)
    }

    async fn fetch_job_list(&self, app_id: &str) -> Result<Vec<JobRecord>> {
        self.get_json(&format!("/api/v1/applications/{}/jobs", app_id))
            .await
    }
}
