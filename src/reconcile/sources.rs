//! Read-only listings
//!
//! Normalized records for every resource of a kind, without managing them.
//! Listings take an optional `(Sort, Order)` applied once all pages are in.

use super::{parse_id, IdentityRecord, JobRecord, ProjectRecord};
use crate::api::{sort_elements, ApiClient, Order, Sort, SortKey};
use anyhow::{Context, Result};

/// Requested ordering of a listing; `None` keeps the service order
pub type ListOrder = Option<(Sort, Order)>;

fn ordered<T: SortKey>(mut elements: Vec<T>, ordering: ListOrder) -> Vec<T> {
    if let Some((sort, order)) = ordering {
        sort_elements(&mut elements, sort, order);
    }
    elements
}

/// All projects visible with the configured key
pub async fn list_projects(client: &ApiClient, ordering: ListOrder) -> Result<Vec<ProjectRecord>> {
    let projects = client
        .fetch_projects()
        .await
        .context("Unable to fetch projects")?;

    ordered(projects, ordering)
        .into_iter()
        .map(ProjectRecord::from_remote)
        .collect()
}

pub async fn project_by_name(client: &ApiClient, name: &str) -> Result<ProjectRecord> {
    let project = client
        .fetch_project_by_name(name)
        .await
        .with_context(|| format!("Unable to fetch project {:?}", name))?;

    ProjectRecord::from_remote(project)
}

/// All identities of a project
pub async fn list_identities(
    client: &ApiClient,
    project_id: &str,
    ordering: ListOrder,
) -> Result<Vec<IdentityRecord>> {
    let project_id = parse_id("project id", project_id)?;

    let identities = client
        .scoped(project_id)
        .fetch_identities()
        .await
        .with_context(|| format!("Unable to fetch identities of project {}", project_id))?;

    ordered(identities, ordering)
        .into_iter()
        .map(|identity| IdentityRecord::from_remote(identity, project_id))
        .collect()
}

/// All jobs of a project
pub async fn list_jobs(client: &ApiClient, project_id: &str, ordering: ListOrder) -> Result<Vec<JobRecord>> {
    let project_id = parse_id("project id", project_id)?;

    let jobs = client
        .scoped(project_id)
        .fetch_jobs()
        .await
        .with_context(|| format!("Unable to fetch jobs of project {}", project_id))?;

    Ok(ordered(jobs, ordering)
        .into_iter()
        .map(|job| JobRecord::from_remote(job, project_id))
        .collect())
}

pub async fn job_by_name(client: &ApiClient, project_id: &str, name: &str) -> Result<JobRecord> {
    let project_id = parse_id("project id", project_id)?;

    let job = client
        .scoped(project_id)
        .fetch_job_by_name(name)
        .await
        .with_context(|| format!("Unable to fetch job {:?}", name))?;

    Ok(JobRecord::from_remote(job, project_id))
}
