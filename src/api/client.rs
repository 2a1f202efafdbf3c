//! Eventline API client
//!
//! Request/response plumbing shared by every endpoint: authentication, the
//! project scope header, JSON encoding and decoding of bodies, and decoding
//! of structured error responses.

use super::error::{ApiError, Error, Result};
use super::id::Id;
use super::path::ApiPath;
use crate::config::ApiConfig;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Header carrying the project a request is scoped to
pub const PROJECT_ID_HEADER: &str = "X-Eventline-Project-Id";

/// Upper bound for a single request, body included
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = match body.char_indices().nth(MAX_LOG_BODY_LENGTH) {
        Some((idx, _)) => format!("{}... [truncated, {} bytes total]", &body[..idx], body.len()),
        None => body.to_string(),
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Request body
#[derive(Debug, Clone, Default)]
pub enum Body {
    #[default]
    Empty,
    /// Serialized JSON document
    Json(Vec<u8>),
    /// Bytes sent as-is
    Raw(Vec<u8>),
}

impl Body {
    /// Serialize a value as a JSON body
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_vec(value).map(Self::Json).map_err(Error::Encode)
    }
}

/// Client for the Eventline HTTP API
///
/// A client value is optionally bound to a project. Scoped operations take
/// a bound copy from [`ApiClient::scoped`]; the original is never mutated.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_uri: Url,
    api_key: Option<String>,
    project_id: Option<Id>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut base_uri = Url::parse(&config.endpoint)
            .map_err(|e| Error::InvalidEndpoint(format!("{}: {}", config.endpoint, e)))?;
        if base_uri.cannot_be_a_base() {
            return Err(Error::InvalidEndpoint(config.endpoint.clone()));
        }
        // Relative paths must resolve below the endpoint path, not beside it
        if !base_uri.path().ends_with('/') {
            let path = format!("{}/", base_uri.path());
            base_uri.set_path(&path);
        }

        let http = Client::builder()
            .user_agent(concat!("evline/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::Transport)?;

        Ok(Self {
            http,
            base_uri,
            api_key: config.key.clone().filter(|k| !k.is_empty()),
            project_id: None,
        })
    }

    /// Copy of this client bound to a project
    pub fn scoped(&self, project_id: Id) -> Self {
        Self {
            project_id: Some(project_id),
            ..self.clone()
        }
    }

    /// Project this client is bound to, if any
    pub fn project_id(&self) -> Option<Id> {
        self.project_id
    }

    pub fn base_uri(&self) -> &Url {
        &self.base_uri
    }

    /// Resolve a relative path against the endpoint
    pub fn url(&self, path: &ApiPath) -> Result<Url> {
        self.base_uri
            .join(&path.to_string())
            .map_err(|e| Error::validation(format!("invalid request path {}: {}", path, e)))
    }

    /// Send a request and discard the response body
    pub async fn send(&self, method: Method, path: &ApiPath, body: Body) -> Result<()> {
        self.execute(method, path, body).await.map(|_| ())
    }

    /// Send a request and decode the JSON response body
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &ApiPath,
        body: Body,
    ) -> Result<T> {
        let data = self.execute(method, path, body).await?;
        decode_body(&data)
    }

    /// Send a request and return the response body verbatim
    pub async fn send_raw(&self, method: Method, path: &ApiPath, body: Body) -> Result<Vec<u8>> {
        self.execute(method, path, body).await
    }

    /// GET a JSON document
    pub async fn get<T: DeserializeOwned>(&self, path: &ApiPath) -> Result<T> {
        self.send_json(Method::GET, path, Body::Empty).await
    }

    async fn execute(&self, method: Method, path: &ApiPath, body: Body) -> Result<Vec<u8>> {
        let url = self.url(path)?;
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method.clone(), url.clone());

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        if let Some(project_id) = &self.project_id {
            request = request.header(PROJECT_ID_HEADER, project_id.to_string());
        }

        request = match body {
            Body::Empty => request,
            Body::Json(data) => request.header(CONTENT_TYPE, "application/json").body(data),
            Body::Raw(data) => request.body(data),
        };

        let response = request.send().await.map_err(Error::Transport)?;
        let status = response.status();
        let data = response.bytes().await.map_err(Error::Transport)?.to_vec();

        if let Err(err) = check_status(status, &data) {
            tracing::warn!(
                "{} {} failed: {} - {}",
                method,
                url,
                status,
                sanitize_for_log(&String::from_utf8_lossy(&data))
            );
            return Err(err);
        }

        Ok(data)
    }
}

/// Turn a non-2xx response into an error
///
/// Structured `{code, message}` bodies become [`Error::Api`] (or
/// [`Error::NotFound`]); anything else keeps the raw status and text.
pub fn check_status(status: StatusCode, body: &[u8]) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }

    match serde_json::from_slice::<ApiError>(body) {
        Ok(api_err) => Err(api_err.into()),
        Err(_) => Err(Error::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(body).into_owned(),
        }),
    }
}

/// Decode a successful response body into a typed value
pub fn decode_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    if body.is_empty() {
        return Err(Error::decode("empty response body"));
    }
    serde_json::from_slice(body).map_err(|e| Error::decode(e.to_string()))
}
