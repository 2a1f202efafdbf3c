//! Jobs
//!
//! A job is deployed by name with its complete specification; every deploy
//! replaces whatever the service had stored for that name. Job endpoints
//! are project-scoped.
//!
//! Spec fields this crate does not model are kept in `extra` maps and sent
//! back unchanged, so a spec read from the service can be redeployed as is.

use super::client::{ApiClient, Body};
use super::cursor::{Sort, SortKey};
use super::error::Result;
use super::id::Id;
use super::paginate::fetch_all;
use super::path::ApiPath;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub disabled: bool,
    pub spec: JobSpec,
}

/// Complete job specification, always submitted as a whole
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub concurrent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<Trigger>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runner: Option<Runner>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identities: Vec<String>,
    /// Days after which executions are deleted, overriding the global setting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    /// `<connector>/<event>`
    pub event: String,
    /// Connector-specific settings, e.g. `{"periodic": 300}` for `time/tick`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Runner {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    Number,
    Integer,
    String,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub parameter_type: ParameterType,
    /// Allowed values, for string parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Environment variable receiving the value during execution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

/// Exactly one of `code`, `command` and `script` is expected per step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<StepCommand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<StepScript>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepCommand {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepScript {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
}

impl SortKey for Job {
    fn sort_key(&self, sort: Sort) -> String {
        match sort {
            Sort::Id => self.id.to_string(),
            Sort::Name => self.spec.name.clone(),
        }
    }
}

impl ApiClient {
    /// List all jobs of the bound project
    pub async fn fetch_jobs(&self) -> Result<Vec<Job>> {
        fetch_all(self, "jobs").await
    }

    pub async fn fetch_job_by_id(&self, id: Id) -> Result<Job> {
        self.get(&ApiPath::new(["jobs", "id", &id.to_string()])?).await
    }

    pub async fn fetch_job_by_name(&self, name: &str) -> Result<Job> {
        self.get(&ApiPath::new(["jobs", "name", name])?).await
    }

    /// Create or replace the job named by the spec
    pub async fn deploy_job(&self, spec: &JobSpec) -> Result<Job> {
        let path = ApiPath::new(["jobs", "name", &spec.name])?;
        self.send_json(Method::PUT, &path, Body::json(spec)?).await
    }

    /// Have the service validate a spec without storing it
    pub async fn deploy_job_dry_run(&self, spec: &JobSpec) -> Result<()> {
        let path = ApiPath::new(["jobs", "name", &spec.name])?.flag("dry-run");
        self.send(Method::PUT, &path, Body::json(spec)?).await
    }

    /// Deploy several jobs in a single request
    pub async fn deploy_jobs(&self, specs: &[JobSpec]) -> Result<Vec<Job>> {
        let path = ApiPath::new(["jobs"])?;
        self.send_json(Method::PUT, &path, Body::json(specs)?).await
    }

    pub async fn deploy_jobs_dry_run(&self, specs: &[JobSpec]) -> Result<()> {
        let path = ApiPath::new(["jobs"])?.flag("dry-run");
        self.send(Method::PUT, &path, Body::json(specs)?).await
    }

    pub async fn delete_job(&self, id: Id) -> Result<()> {
        let path = ApiPath::new(["jobs", "id", &id.to_string()])?;
        self.send(Method::DELETE, &path, Body::Empty).await
    }
}
