//! Job reconciler
//!
//! Jobs are deployed by name with their complete spec, so create and update
//! both go through a deploy. The spec is never patched field by field.

use super::{
    delete_outcome, parse_id, parse_import_key, read_outcome, DeleteOutcome, ReadOutcome,
};
use crate::api::jobs::{Job, JobSpec};
use crate::api::{ApiClient, Error, Id, ResourceKind};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Desired state of a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPlan {
    pub project_id: String,
    pub spec: JobSpec,
}

/// Persisted state of a job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub project_id: String,
    #[serde(default)]
    pub disabled: bool,
    pub spec: JobSpec,
}

impl JobRecord {
    pub(crate) fn from_remote(job: Job, project_id: Id) -> Self {
        Self {
            id: job.id.to_string(),
            project_id: job.project_id.unwrap_or(project_id).to_string(),
            disabled: job.disabled,
            spec: job.spec,
        }
    }
}

pub struct JobReconciler {
    client: ApiClient,
}

impl JobReconciler {
    pub fn new(client: &ApiClient) -> Self {
        Self {
            client: client.clone(),
        }
    }

    /// Have the service validate the spec without deploying it
    pub async fn check(&self, plan: &JobPlan) -> Result<()> {
        let project_id = parse_id("project id", &plan.project_id)?;

        self.client
            .scoped(project_id)
            .deploy_job_dry_run(&plan.spec)
            .await
            .with_context(|| format!("Invalid spec for job {:?}", plan.spec.name))
    }

    pub async fn create(&self, plan: &JobPlan) -> Result<JobRecord> {
        let project_id = parse_id("project id", &plan.project_id)?;

        let job = self
            .client
            .scoped(project_id)
            .deploy_job(&plan.spec)
            .await
            .with_context(|| format!("Unable to deploy job {:?}", plan.spec.name))?;

        tracing::info!("Deployed job {} ({}) in project {}", plan.spec.name, job.id, project_id);
        Ok(JobRecord {
            id: job.id.to_string(),
            project_id: project_id.to_string(),
            disabled: job.disabled,
            spec: plan.spec.clone(),
        })
    }

    /// Validate several specs in one request
    pub async fn check_all(&self, project_id: &str, specs: &[JobSpec]) -> Result<()> {
        let project_id = parse_id("project id", project_id)?;

        self.client
            .scoped(project_id)
            .deploy_jobs_dry_run(specs)
            .await
            .with_context(|| format!("Invalid specs for {} jobs", specs.len()))
    }

    /// Deploy several jobs in one request
    pub async fn create_all(&self, project_id: &str, specs: &[JobSpec]) -> Result<Vec<JobRecord>> {
        let project_id = parse_id("project id", project_id)?;

        let jobs = self
            .client
            .scoped(project_id)
            .deploy_jobs(specs)
            .await
            .with_context(|| format!("Unable to deploy {} jobs", specs.len()))?;

        tracing::info!("Deployed {} jobs in project {}", jobs.len(), project_id);
        Ok(jobs
            .into_iter()
            .map(|job| JobRecord::from_remote(job, project_id))
            .collect())
    }

    pub async fn read(&self, record: &JobRecord) -> Result<ReadOutcome<JobRecord>> {
        let project_id = parse_id("project id", &record.project_id)?;
        let id = parse_id("job id", &record.id)?;

        let outcome = read_outcome(
            ResourceKind::Job,
            self.client.scoped(project_id).fetch_job_by_id(id).await,
        )
        .with_context(|| format!("Unable to fetch job {}", id))?;

        match outcome {
            ReadOutcome::Synced(job) => Ok(ReadOutcome::Synced(JobRecord::from_remote(job, project_id))),
            ReadOutcome::Removed => {
                tracing::info!("Job {} no longer exists", id);
                Ok(ReadOutcome::Removed)
            }
        }
    }

    /// Redeploy the job with the complete desired spec
    ///
    /// The job name is its deployment key: deploying under another name
    /// would create a second job, so renames are rejected.
    pub async fn update(&self, record: &JobRecord, plan: &JobPlan) -> Result<JobRecord> {
        let project_id = parse_id("project id", &plan.project_id)?;
        let id = parse_id("job id", &record.id)?;

        if !record.spec.name.is_empty() && record.spec.name != plan.spec.name {
            return Err(Error::validation(format!(
                "cannot rename job {:?} to {:?}, the job must be replaced",
                record.spec.name, plan.spec.name
            )))
            .with_context(|| format!("Unable to update job {}", id));
        }

        let job = self
            .client
            .scoped(project_id)
            .deploy_job(&plan.spec)
            .await
            .with_context(|| format!("Unable to update job {}", id))?;

        if job.id != id {
            tracing::warn!("Job {:?} was deployed as {} instead of {}", plan.spec.name, job.id, id);
        }

        Ok(JobRecord {
            id: job.id.to_string(),
            project_id: project_id.to_string(),
            disabled: job.disabled,
            spec: plan.spec.clone(),
        })
    }

    pub async fn delete(&self, record: &JobRecord) -> Result<DeleteOutcome> {
        let project_id = parse_id("project id", &record.project_id)?;
        let id = parse_id("job id", &record.id)?;

        let outcome = delete_outcome(
            ResourceKind::Job,
            self.client.scoped(project_id).delete_job(id).await,
        )
        .with_context(|| format!("Unable to delete job {}", id))?;

        if outcome == DeleteOutcome::AlreadyAbsent {
            tracing::info!("Job {} was already deleted", id);
        }
        Ok(outcome)
    }

    /// Seed a record from `<project-id>/<job-id>`
    pub fn import(&self, key: &str) -> Result<JobRecord> {
        let key = parse_import_key(key, "projectID/jobID")?;

        Ok(JobRecord {
            id: key.resource,
            project_id: key.scope,
            ..Default::default()
        })
    }
}
