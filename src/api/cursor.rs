//! Cursors and pages
//!
//! Every collection endpoint returns a [`Page`] and accepts a [`Cursor`]
//! encoded in the query string.

use super::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Page size used when the caller does not pick one
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Ordering direction of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for Order {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(Error::validation(format!("unknown order {:?}", s))),
        }
    }
}

/// Attribute a listing can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    Id,
    Name,
}

impl Sort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
        }
    }
}

impl FromStr for Sort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            _ => Err(Error::validation(format!("unknown sort {:?}", s))),
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Elements that can be ordered by a [`Sort`] attribute
pub trait SortKey {
    fn sort_key(&self, sort: Sort) -> String;
}

/// Order already fetched elements by one of their attributes
///
/// Id keys are 27-character base62 strings, so comparing them as text
/// orders them by creation time.
pub fn sort_elements<T: SortKey>(elements: &mut [T], sort: Sort, order: Order) {
    elements.sort_by_cached_key(|element| element.sort_key(sort));
    if order == Order::Desc {
        elements.reverse();
    }
}

/// Position in a collection
///
/// `before` and `after` are opaque tokens produced by the service; the sort
/// attribute is carried as received so that cursors from any collection
/// round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
}

fn default_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for Cursor {
    fn default() -> Self {
        Self::with_size(DEFAULT_PAGE_SIZE)
    }
}

impl Cursor {
    pub fn with_size(size: u32) -> Self {
        Self {
            before: None,
            after: None,
            size,
            sort: None,
            order: None,
        }
    }

    pub fn sorted_by(mut self, sort: Sort, order: Order) -> Self {
        self.sort = Some(sort.as_str().to_string());
        self.order = Some(order);
        self
    }

    /// Query parameters, absent fields omitted
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(before) = &self.before {
            pairs.push(("before", before.clone()));
        }
        if let Some(after) = &self.after {
            pairs.push(("after", after.clone()));
        }
        pairs.push(("size", self.size.to_string()));
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        if let Some(order) = &self.order {
            pairs.push(("order", order.as_str().to_string()));
        }

        pairs
    }
}

/// One page of a collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub elements: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<Cursor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Cursor>,
}
