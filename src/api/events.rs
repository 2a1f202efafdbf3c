//! Events
//!
//! Events are produced by connectors and start the jobs they trigger. The
//! only write operation is replay, which creates a new event carrying the
//! same data and runs the triggered job again.

use super::client::{ApiClient, Body};
use super::error::Result;
use super::id::Id;
use super::path::ApiPath;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: Id,
    pub project_id: Id,
    pub job_id: Id,
    pub creation_time: DateTime<Utc>,
    pub event_time: DateTime<Utc>,
    pub connector: String,
    pub name: String,
    /// Connector-specific event payload
    #[serde(default)]
    pub data: Value,
    /// Set on replayed events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_event_id: Option<Id>,
    #[serde(default)]
    pub processed: bool,
}

impl ApiClient {
    /// Replay an event, returning the newly created one
    pub async fn replay_event(&self, id: Id) -> Result<Event> {
        let path = ApiPath::new(["events", "id", &id.to_string(), "replay"])?;
        self.send_json(Method::POST, &path, Body::Empty).await
    }
}
