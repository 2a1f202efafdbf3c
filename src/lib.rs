//! Declarative management of Eventline resources
//!
//! [`api`] talks to the Eventline HTTP API; [`reconcile`] maps declared
//! records for projects, identities and jobs onto that API.

pub mod api;
pub mod config;
pub mod reconcile;
