//! Relative API paths
//!
//! Paths are assembled from segments, each percent-encoded on its own, so a
//! resource name can never add or remove path components. Segments that URL
//! resolution would collapse (`.`, `..` and the empty segment) are refused.

use super::error::{Error, Result};
use std::fmt;

/// Path relative to the API endpoint, with an optional query string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    segments: Vec<String>,
    query: Vec<(String, Option<String>)>,
}

impl ApiPath {
    pub fn new<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments = segments
            .into_iter()
            .map(|s| match s.as_ref() {
                "" => Err(Error::validation("empty path segment")),
                "." | ".." => Err(Error::validation(format!(
                    "invalid path segment {:?}",
                    s.as_ref()
                ))),
                segment => Ok(urlencoding::encode(segment).into_owned()),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            segments,
            query: Vec::new(),
        })
    }

    /// Add a `key=value` query parameter
    pub fn query(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.query.push((key.to_string(), Some(value.to_string())));
        self
    }

    /// Add a bare `key` query flag, e.g. `dry-run`
    pub fn flag(mut self, key: &str) -> Self {
        self.query.push((key.to_string(), None));
        self
    }

    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (&'static str, String)>) -> Self {
        for (key, value) in pairs {
            self = self.query(key, value);
        }
        self
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))?;

        for (i, (key, value)) in self.query.iter().enumerate() {
            f.write_str(if i == 0 { "?" } else { "&" })?;
            f.write_str(&urlencoding::encode(key))?;
            if let Some(value) = value {
                write!(f, "={}", urlencoding::encode(value))?;
            }
        }

        Ok(())
    }
}
