//! API Errors
//!
//! Error taxonomy for calls against the Eventline HTTP API. Structured
//! rejections from the service are kept intact so that callers can match on
//! them; "unknown_<kind>" rejections get their own variant.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Resource kinds addressed by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Project,
    Identity,
    Job,
    JobExecution,
    Event,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Project,
        ResourceKind::Identity,
        ResourceKind::Job,
        ResourceKind::JobExecution,
        ResourceKind::Event,
    ];

    /// Name used in URLs, error codes and log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Identity => "identity",
            Self::Job => "job",
            Self::JobExecution => "job_execution",
            Self::Event => "event",
        }
    }

    /// Error code the service returns when a resource of this kind does not exist
    pub fn unknown_code(&self) -> &'static str {
        match self {
            Self::Project => "unknown_project",
            Self::Identity => "unknown_identity",
            Self::Job => "unknown_job",
            Self::JobExecution => "unknown_job_execution",
            Self::Event => "unknown_event",
        }
    }

    /// Resolve an error code to the kind it reports as absent, if any
    pub fn from_unknown_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.unknown_code() == code)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error body returned by the service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Errors produced by the API client
#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced a response (connection, DNS, timeout)
    #[error("cannot send request: {0}")]
    Transport(#[source] reqwest::Error),

    /// The request body could not be serialized
    #[error("cannot encode body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The response body could not be turned into the expected value
    #[error("cannot decode response body: {message}")]
    Decode { message: String },

    /// The service rejected the request with a structured error
    #[error("{message} ({code})")]
    Api { code: String, message: String },

    /// The service reported that the addressed resource does not exist
    #[error("{kind} not found: {message}")]
    NotFound { kind: ResourceKind, message: String },

    /// Non-2xx response whose body is not a structured error
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// Caller-supplied value rejected before any request was made
    #[error("{0}")]
    Validation(String),

    /// A page pointed back at the cursor used to fetch it
    #[error("pagination cursor did not advance")]
    StalledCursor,

    /// The configured endpoint is not a usable base URL
    #[error("invalid api endpoint: {0}")]
    InvalidEndpoint(String),
}

impl Error {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error reports that a resource of `kind` does not exist
    pub fn is_not_found(&self, kind: ResourceKind) -> bool {
        matches!(self, Self::NotFound { kind: k, .. } if *k == kind)
    }

    /// Error code of a structured rejection, including not-found ones
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            Self::NotFound { kind, .. } => Some(kind.unknown_code()),
            _ => None,
        }
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        match ResourceKind::from_unknown_code(&err.code) {
            Some(kind) => Self::NotFound {
                kind,
                message: err.message,
            },
            None => Self::Api {
                code: err.code,
                message: err.message,
            },
        }
    }
}

/// Result type for API client operations
pub type Result<T> = std::result::Result<T, Error>;
