//! Projects
//!
//! Functions for listing and managing Eventline projects.

use super::client::{ApiClient, Body};
use super::cursor::{Sort, SortKey};
use super::error::Result;
use super::id::Id;
use super::paginate::fetch_all;
use super::path::ApiPath;
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Project information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Assigned by the service; absent until the project is created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub name: String,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}

impl SortKey for Project {
    fn sort_key(&self, sort: Sort) -> String {
        match sort {
            Sort::Id => self.id.map(|id| id.to_string()).unwrap_or_default(),
            Sort::Name => self.name.clone(),
        }
    }
}

impl ApiClient {
    /// List all projects
    pub async fn fetch_projects(&self) -> Result<Vec<Project>> {
        fetch_all(self, "projects").await
    }

    pub async fn fetch_project_by_id(&self, id: Id) -> Result<Project> {
        self.get(&ApiPath::new(["projects", "id", &id.to_string()])?).await
    }

    pub async fn fetch_project_by_name(&self, name: &str) -> Result<Project> {
        self.get(&ApiPath::new(["projects", "name", name])?).await
    }

    /// Create a project, returning it with its assigned id
    pub async fn create_project(&self, project: &Project) -> Result<Project> {
        self.send_json(Method::POST, &ApiPath::new(["projects"])?, Body::json(project)?)
            .await
    }

    /// Replace a project
    pub async fn update_project(&self, id: Id, project: &Project) -> Result<()> {
        let path = ApiPath::new(["projects", "id", &id.to_string()])?;
        self.send(Method::PUT, &path, Body::json(project)?).await
    }

    pub async fn delete_project(&self, id: Id) -> Result<()> {
        let path = ApiPath::new(["projects", "id", &id.to_string()])?;
        self.send(Method::DELETE, &path, Body::Empty).await
    }
}
