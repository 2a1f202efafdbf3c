//! Project reconciler

use super::{delete_outcome, parse_id, read_outcome, DeleteOutcome, ReadOutcome};
use crate::api::projects::Project;
use crate::api::{ApiClient, Error, ResourceKind};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Desired attributes of a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPlan {
    pub name: String,
}

/// Persisted state of a project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
}

impl ProjectRecord {
    pub(crate) fn from_remote(project: Project) -> Result<Self> {
        let id = project
            .id
            .ok_or_else(|| Error::decode("project without id"))
            .with_context(|| format!("Unable to read project {:?}", project.name))?;

        Ok(Self {
            id: id.to_string(),
            name: project.name,
        })
    }
}

pub struct ProjectReconciler {
    client: ApiClient,
}

impl ProjectReconciler {
    pub fn new(client: &ApiClient) -> Self {
        Self {
            client: client.clone(),
        }
    }

    pub async fn create(&self, plan: &ProjectPlan) -> Result<ProjectRecord> {
        let project = self
            .client
            .create_project(&Project::new(plan.name.clone()))
            .await
            .with_context(|| format!("Unable to create project {:?}", plan.name))?;

        let record = ProjectRecord::from_remote(project)?;
        tracing::info!("Created project {} ({})", record.name, record.id);
        Ok(record)
    }

    pub async fn read(&self, record: &ProjectRecord) -> Result<ReadOutcome<ProjectRecord>> {
        let id = parse_id("project id", &record.id)?;

        let outcome = read_outcome(
            ResourceKind::Project,
            self.client.fetch_project_by_id(id).await,
        )
        .with_context(|| format!("Unable to fetch project {}", id))?;

        match outcome {
            ReadOutcome::Synced(project) => Ok(ReadOutcome::Synced(ProjectRecord {
                id: id.to_string(),
                name: project.name,
            })),
            ReadOutcome::Removed => {
                tracing::info!("Project {} no longer exists", id);
                Ok(ReadOutcome::Removed)
            }
        }
    }

    /// Replace the project with the desired attributes
    pub async fn update(&self, record: &ProjectRecord, plan: &ProjectPlan) -> Result<ProjectRecord> {
        let id = parse_id("project id", &record.id)?;

        let project = Project {
            id: Some(id),
            name: plan.name.clone(),
        };
        self.client
            .update_project(id, &project)
            .await
            .with_context(|| format!("Unable to update project {}", id))?;

        Ok(ProjectRecord {
            id: id.to_string(),
            name: plan.name.clone(),
        })
    }

    pub async fn delete(&self, record: &ProjectRecord) -> Result<DeleteOutcome> {
        let id = parse_id("project id", &record.id)?;

        let outcome = delete_outcome(ResourceKind::Project, self.client.delete_project(id).await)
            .with_context(|| format!("Unable to delete project {}", id))?;

        if outcome == DeleteOutcome::AlreadyAbsent {
            tracing::info!("Project {} was already deleted", id);
        }
        Ok(outcome)
    }

    /// Projects are not scoped: the import key is the project id itself
    pub fn import(&self, key: &str) -> Result<ProjectRecord> {
        if key.is_empty() {
            return Err(Error::validation("unexpected import identifier format"))
                .context("Expected import identifier with format: projectID");
        }

        Ok(ProjectRecord {
            id: key.to_string(),
            ..Default::default()
        })
    }
}
