//! Resource reconciliation
//!
//! Maps declared records onto the lifecycle of remote resources. Each
//! resource kind has its own reconciler with the same five operations:
//!
//! - `create` submits the desired attributes and adopts the assigned id
//! - `read` refreshes a record, or reports the resource as removed
//! - `update` replaces the whole remote resource with the desired one
//! - `delete` removes the resource; deleting an absent resource succeeds
//! - `import` seeds a minimal record from an external key
//!
//! Records keep ids as the strings the caller persisted; every operation
//! validates them with [`Id::parse`] before they reach a request path.
//! Errors are returned with context naming the call and the resource; the
//! underlying [`crate::api::Error`] can be recovered with
//! `anyhow::Error::downcast_ref`.

pub mod drift;
pub mod identity;
pub mod job;
pub mod project;
pub mod sources;

pub use identity::{IdentityPlan, IdentityReconciler, IdentityRecord};
pub use job::{JobPlan, JobReconciler, JobRecord};
pub use project::{ProjectPlan, ProjectReconciler, ProjectRecord};
pub use sources::ListOrder;

use crate::api::{self, Error, Id, ResourceKind};
use anyhow::Context;
use std::fmt;
use std::str::FromStr;

/// Result of refreshing a record
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome<T> {
    /// The resource exists; the refreshed record replaces the old one
    Synced(T),
    /// The resource is gone; the caller should drop its record
    Removed,
}

impl<T> ReadOutcome<T> {
    pub fn into_record(self) -> Option<T> {
        match self {
            Self::Synced(record) => Some(record),
            Self::Removed => None,
        }
    }
}

/// Result of a successful delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The resource did not exist, which is the desired end state
    AlreadyAbsent,
}

/// Treat "unknown_<kind>" as a removed resource
pub(crate) fn read_outcome<T>(kind: ResourceKind, result: api::Result<T>) -> api::Result<ReadOutcome<T>> {
    match result {
        Ok(value) => Ok(ReadOutcome::Synced(value)),
        Err(err) if err.is_not_found(kind) => Ok(ReadOutcome::Removed),
        Err(err) => Err(err),
    }
}

/// Treat "unknown_<kind>" as a successful delete
pub(crate) fn delete_outcome(kind: ResourceKind, result: api::Result<()>) -> api::Result<DeleteOutcome> {
    match result {
        Ok(()) => Ok(DeleteOutcome::Deleted),
        Err(err) if err.is_not_found(kind) => Ok(DeleteOutcome::AlreadyAbsent),
        Err(err) => Err(err),
    }
}

/// Validate an id coming from a record
pub fn parse_id(field: &str, value: &str) -> anyhow::Result<Id> {
    Id::parse(value).with_context(|| format!("Unable to parse {} {:?}", field, value))
}

/// Import key of a project-scoped resource: `<scope-id>/<resource-id>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportKey {
    pub scope: String,
    pub resource: String,
}

impl FromStr for ImportKey {
    type Err = Error;

    fn from_str(s: &str) -> api::Result<Self> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [scope, resource] if !scope.is_empty() && !resource.is_empty() => Ok(Self {
                scope: scope.to_string(),
                resource: resource.to_string(),
            }),
            _ => Err(Error::validation("unexpected import identifier format")),
        }
    }
}

impl fmt::Display for ImportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope, self.resource)
    }
}

/// Parse a scoped import key, naming the expected shape on failure
pub(crate) fn parse_import_key(key: &str, expected: &str) -> anyhow::Result<ImportKey> {
    key.parse().with_context(|| {
        format!(
            "Expected import identifier with format: {}. Got: {:?}",
            expected, key
        )
    })
}
