//! Eventline API interaction module
//!
//! This module provides the client for the Eventline HTTP API and the
//! resource types it exchanges.
//!
//! # Module Structure
//!
//! - [`client`] - Authenticated request/response plumbing
//! - [`error`] - Error taxonomy, including not-found classification
//! - [`id`] - Identifier (KSUID) validation
//! - [`cursor`] / [`paginate`] - Cursor pagination
//! - [`projects`], [`identities`], [`jobs`], [`executions`], [`events`] - Endpoints
//!
//! # Example
//!
//! ```ignore
//! use evline::api::{ApiClient, Id};
//! use evline::config::ApiConfig;
//!
//! async fn example(config: &ApiConfig, project: &str) -> anyhow::Result<()> {
//!     let client = ApiClient::new(config)?;
//!     let scoped = client.scoped(Id::parse(project)?);
//!     let identities = scoped.fetch_identities().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod cursor;
pub mod error;
pub mod events;
pub mod executions;
pub mod id;
pub mod identities;
pub mod jobs;
pub mod paginate;
pub mod path;
pub mod projects;

pub use client::{ApiClient, Body, PROJECT_ID_HEADER};
pub use cursor::{sort_elements, Cursor, Order, Page, Sort, SortKey};
pub use error::{ApiError, Error, ResourceKind, Result};
pub use id::Id;
