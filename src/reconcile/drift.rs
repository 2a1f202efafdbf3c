//! Drift detection for opaque JSON payloads
//!
//! Two payloads are the same if they parse to the same JSON value; key
//! order, whitespace and escaping do not count as drift.

use serde_json::Value;

/// Whether two JSON texts describe the same value
pub fn json_equivalent(a: &str, b: &str) -> serde_json::Result<bool> {
    let a: Value = serde_json::from_str(a)?;
    let b: Value = serde_json::from_str(b)?;
    Ok(a == b)
}

/// Payload a record should hold after reading `remote`
///
/// Returns `None` when the local text is equivalent and must be kept as
/// declared. A local text that is not valid JSON (e.g. a freshly imported
/// record) always counts as drift.
pub fn refreshed_payload(local: &str, remote: &str) -> Option<String> {
    match json_equivalent(local, remote) {
        Ok(true) => None,
        Ok(false) | Err(_) => Some(remote.to_string()),
    }
}
