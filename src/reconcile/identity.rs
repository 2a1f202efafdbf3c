//! Identity reconciler
//!
//! The `data` attribute is the connector payload as declared by the caller.
//! It is sent verbatim and only replaced on read when the remote payload is
//! a different JSON value, see [`super::drift`].

use super::drift::refreshed_payload;
use super::{
    delete_outcome, parse_id, parse_import_key, read_outcome, DeleteOutcome, ReadOutcome,
};
use crate::api::identities::{Identity, IdentityData, IdentityStatus};
use crate::api::{ApiClient, Error, Id, ResourceKind};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Desired attributes of an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityPlan {
    pub project_id: String,
    pub name: String,
    pub connector: String,
    #[serde(rename = "type")]
    pub identity_type: String,
    /// Connector payload as JSON text
    pub data: String,
}

/// Persisted state of an identity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub connector: String,
    #[serde(rename = "type")]
    pub identity_type: String,
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IdentityStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl IdentityRecord {
    pub(crate) fn from_remote(identity: Identity, project_id: Id) -> Result<Self> {
        let id = identity
            .id
            .ok_or_else(|| Error::decode("identity without id"))
            .with_context(|| format!("Unable to read identity {:?}", identity.name))?;

        Ok(Self {
            id: id.to_string(),
            project_id: identity.project_id.unwrap_or(project_id).to_string(),
            name: identity.name,
            connector: identity.connector,
            identity_type: identity.identity_type,
            data: identity.data.as_str().to_string(),
            status: identity.status,
            error_message: identity.error_message,
        })
    }
}

impl IdentityPlan {
    fn to_identity(&self, id: Option<Id>, project_id: Id) -> Result<Identity> {
        let data = IdentityData::from_json_str(&self.data)
            .with_context(|| format!("Invalid data for identity {:?}", self.name))?;

        Ok(Identity {
            id,
            project_id: Some(project_id),
            name: self.name.clone(),
            status: None,
            error_message: None,
            creation_time: None,
            update_time: None,
            last_use_time: None,
            refresh_time: None,
            connector: self.connector.clone(),
            identity_type: self.identity_type.clone(),
            data,
        })
    }

    fn to_record(&self, id: Id, stored: &Identity) -> IdentityRecord {
        IdentityRecord {
            id: id.to_string(),
            project_id: self.project_id.clone(),
            name: self.name.clone(),
            connector: self.connector.clone(),
            identity_type: self.identity_type.clone(),
            data: self.data.clone(),
            status: stored.status,
            error_message: stored.error_message.clone(),
        }
    }
}

pub struct IdentityReconciler {
    client: ApiClient,
}

impl IdentityReconciler {
    pub fn new(client: &ApiClient) -> Self {
        Self {
            client: client.clone(),
        }
    }

    pub async fn create(&self, plan: &IdentityPlan) -> Result<IdentityRecord> {
        let project_id = parse_id("project id", &plan.project_id)?;
        let identity = plan.to_identity(None, project_id)?;

        let created = self
            .client
            .scoped(project_id)
            .create_identity(&identity)
            .await
            .with_context(|| format!("Unable to create identity {:?}", plan.name))?;

        let id = created
            .id
            .ok_or_else(|| Error::decode("identity without id"))
            .with_context(|| format!("Unable to create identity {:?}", plan.name))?;

        tracing::info!("Created identity {} ({}) in project {}", plan.name, id, project_id);
        Ok(plan.to_record(id, &created))
    }

    pub async fn read(&self, record: &IdentityRecord) -> Result<ReadOutcome<IdentityRecord>> {
        let project_id = parse_id("project id", &record.project_id)?;
        let id = parse_id("identity id", &record.id)?;

        let outcome = read_outcome(
            ResourceKind::Identity,
            self.client.scoped(project_id).fetch_identity_by_id(id).await,
        )
        .with_context(|| format!("Unable to fetch identity {}", id))?;

        let identity = match outcome {
            ReadOutcome::Synced(identity) => identity,
            ReadOutcome::Removed => {
                tracing::info!("Identity {} no longer exists", id);
                return Ok(ReadOutcome::Removed);
            }
        };

        let data = match refreshed_payload(&record.data, identity.data.as_str()) {
            Some(remote) => {
                tracing::debug!("Identity {} data differs from the stored record", id);
                remote
            }
            None => record.data.clone(),
        };

        Ok(ReadOutcome::Synced(IdentityRecord {
            id: id.to_string(),
            project_id: project_id.to_string(),
            name: identity.name,
            connector: identity.connector,
            identity_type: identity.identity_type,
            data,
            status: identity.status,
            error_message: identity.error_message,
        }))
    }

    /// Replace the identity with the desired attributes
    pub async fn update(&self, record: &IdentityRecord, plan: &IdentityPlan) -> Result<IdentityRecord> {
        let project_id = parse_id("project id", &plan.project_id)?;
        let id = parse_id("identity id", &record.id)?;
        let identity = plan.to_identity(Some(id), project_id)?;

        let stored = self
            .client
            .scoped(project_id)
            .update_identity(id, &identity)
            .await
            .with_context(|| format!("Unable to update identity {}", id))?;

        Ok(plan.to_record(id, &stored))
    }

    pub async fn delete(&self, record: &IdentityRecord) -> Result<DeleteOutcome> {
        let project_id = parse_id("project id", &record.project_id)?;
        let id = parse_id("identity id", &record.id)?;

        let outcome = delete_outcome(
            ResourceKind::Identity,
            self.client.scoped(project_id).delete_identity(id).await,
        )
        .with_context(|| format!("Unable to delete identity {}", id))?;

        if outcome == DeleteOutcome::AlreadyAbsent {
            tracing::info!("Identity {} was already deleted", id);
        }
        Ok(outcome)
    }

    /// Seed a record from `<project-id>/<identity-id>`
    pub fn import(&self, key: &str) -> Result<IdentityRecord> {
        let key = parse_import_key(key, "projectID/identityID")?;

        Ok(IdentityRecord {
            id: key.resource,
            project_id: key.scope,
            ..Default::default()
        })
    }
}
