//! Job executions
//!
//! Starting jobs and controlling the resulting executions.

use super::client::{ApiClient, Body};
use super::error::Result;
use super::id::Id;
use super::jobs::JobSpec;
use super::path::ApiPath;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobExecutionStatus {
    Created,
    Started,
    Aborted,
    Successful,
    Failed,
}

impl JobExecutionStatus {
    /// Whether the execution can no longer change state on its own
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Aborted | Self::Successful | Self::Failed)
    }
}

impl fmt::Display for JobExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Started => "started",
            Self::Aborted => "aborted",
            Self::Successful => "successful",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobExecution {
    pub id: Id,
    pub project_id: Id,
    pub job_id: Id,
    pub job_spec: JobSpec,
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
    pub creation_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
    pub scheduled_time: DateTime<Utc>,
    pub status: JobExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
}

/// Parameters supplied when starting a job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobExecutionInput {
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
}

impl ApiClient {
    /// Start an execution of a job
    pub async fn execute_job(&self, job_id: Id, input: &JobExecutionInput) -> Result<JobExecution> {
        let path = ApiPath::new(["jobs", "id", &job_id.to_string(), "execute"])?;
        self.send_json(Method::POST, &path, Body::json(input)?).await
    }

    pub async fn fetch_job_execution(&self, id: Id) -> Result<JobExecution> {
        self.get(&ApiPath::new(["job_executions", "id", &id.to_string()])?)
            .await
    }

    pub async fn abort_job_execution(&self, id: Id) -> Result<()> {
        let path = ApiPath::new(["job_executions", "id", &id.to_string(), "abort"])?;
        self.send(Method::POST, &path, Body::Empty).await
    }

    pub async fn restart_job_execution(&self, id: Id) -> Result<()> {
        let path = ApiPath::new(["job_executions", "id", &id.to_string(), "restart"])?;
        self.send(Method::POST, &path, Body::Empty).await
    }
}
