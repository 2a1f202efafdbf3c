//! Identities
//!
//! Identities carry connector-specific credentials in their `data` field.
//! The payload is kept as raw JSON text: this crate never interprets it, and
//! code that knows a connector decodes it with [`IdentityData::decode`].
//!
//! Identity endpoints are project-scoped; call them on a client returned by
//! [`ApiClient::scoped`].

use super::client::{ApiClient, Body};
use super::cursor::{Sort, SortKey};
use super::error::{Error, Result};
use super::id::Id;
use super::paginate::fetch_all;
use super::path::ApiPath;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::fmt;

/// Opaque connector payload
///
/// The raw JSON text is the source of truth and is transmitted unchanged.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityData(Box<RawValue>);

impl IdentityData {
    /// Wrap JSON text, checking only that it is well-formed
    pub fn from_json_str(json: &str) -> Result<Self> {
        RawValue::from_string(json.to_string())
            .map(Self)
            .map_err(Error::Encode)
    }

    /// Serialize a typed connector payload
    pub fn encode<T: Serialize>(value: &T) -> Result<Self> {
        serde_json::value::to_raw_value(value)
            .map(Self)
            .map_err(Error::Encode)
    }

    /// Interpret the payload as a connector-specific type
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(self.0.get()).map_err(|e| Error::decode(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        self.0.get()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.get().as_bytes()
    }
}

impl PartialEq for IdentityData {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for IdentityData {}

// Identity data holds credentials
impl fmt::Debug for IdentityData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityData(<{} bytes>)", self.as_str().len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityStatus {
    Pending,
    Ready,
    Error,
}

impl IdentityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for IdentityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity as exchanged with the service
///
/// Server-computed fields are skipped when absent so that the same type
/// serves as create/update payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<Id>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IdentityStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_use_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_time: Option<DateTime<Utc>>,
    pub connector: String,
    #[serde(rename = "type")]
    pub identity_type: String,
    pub data: IdentityData,
}

impl SortKey for Identity {
    fn sort_key(&self, sort: Sort) -> String {
        match sort {
            Sort::Id => self.id.map(|id| id.to_string()).unwrap_or_default(),
            Sort::Name => self.name.clone(),
        }
    }
}

impl ApiClient {
    /// List all identities of the bound project
    pub async fn fetch_identities(&self) -> Result<Vec<Identity>> {
        fetch_all(self, "identities").await
    }

    pub async fn fetch_identity_by_id(&self, id: Id) -> Result<Identity> {
        self.get(&ApiPath::new(["identities", "id", &id.to_string()])?).await
    }

    /// Create an identity, returning it with its assigned id and status
    pub async fn create_identity(&self, identity: &Identity) -> Result<Identity> {
        self.send_json(Method::POST, &ApiPath::new(["identities"])?, Body::json(identity)?)
            .await
    }

    /// Replace an identity, returning the stored result
    pub async fn update_identity(&self, id: Id, identity: &Identity) -> Result<Identity> {
        let path = ApiPath::new(["identities", "id", &id.to_string()])?;
        self.send_json(Method::PUT, &path, Body::json(identity)?).await
    }

    pub async fn delete_identity(&self, id: Id) -> Result<()> {
        let path = ApiPath::new(["identities", "id", &id.to_string()])?;
        self.send(Method::DELETE, &path, Body::Empty).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_data_is_kept_verbatim() {
        let text = r#"{"b": 2,   "a": [1, 2]}"#;
        let data = IdentityData::from_json_str(text).unwrap();
        assert_eq!(data.as_str(), text);

        let identity_json = format!(
            r#"{{"name":"gh","connector":"github","type":"oauth2","data":{}}}"#,
            text
        );
        let identity: Identity = serde_json::from_str(&identity_json).unwrap();
        assert_eq!(identity.data.as_str(), text);
        assert!(serde_json::to_string(&identity).unwrap().contains(text));
    }

    #[test]
    fn test_identity_data_rejects_malformed_json() {
        assert!(matches!(
            IdentityData::from_json_str("{not json"),
            Err(Error::Encode(_))
        ));
    }

    #[test]
    fn test_identity_data_typed_interpretation() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Password {
            login: String,
            password: String,
        }

        let data = IdentityData::from_json_str(r#"{"login":"bob","password":"hunter2"}"#).unwrap();
        let typed: Password = data.decode().unwrap();
        assert_eq!(typed.login, "bob");

        let encoded = IdentityData::encode(&typed).unwrap();
        assert_eq!(encoded.decode::<Password>().unwrap(), typed);
    }

    #[test]
    fn test_identity_data_debug_hides_content() {
        let data = IdentityData::from_json_str(r#"{"password":"hunter2"}"#).unwrap();
        assert!(!format!("{:?}", data).contains("hunter2"));
    }

    #[test]
    fn test_identity_decodes_server_fields() {
        let identity: Identity = serde_json::from_str(&json!({
            "id": "0ujtsYcgvSTl8PAuAdqWYSMnLOv",
            "project_id": "0ujsswThIGTUYm2K8FjOOfXtY1K",
            "name": "gh",
            "status": "ready",
            "creation_time": "2023-04-01T10:00:00Z",
            "update_time": "2023-04-01T10:00:00Z",
            "connector": "github",
            "type": "oauth2",
            "data": {"token": "x"}
        })
        .to_string())
        .unwrap();

        assert_eq!(identity.status, Some(IdentityStatus::Ready));
        assert_eq!(identity.identity_type, "oauth2");
        assert!(identity.creation_time.is_some());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result = serde_json::from_str::<Identity>(&json!({
            "name": "gh",
            "status": "exploded",
            "connector": "github",
            "type": "oauth2",
            "data": {}
        })
        .to_string());
        assert!(result.is_err());
    }
}
