//! Pagination utilities for Redmine API responses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::resource::ResourceSpec;

/// A page of results from the Redmine API.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "T: Serialize")]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Total number of items across all pages (if reported).
    pub total_count: Option<u64>,
    /// Offset of the first item on this page.
    pub offset: u64,
    /// Page size the service applied (if reported).
    pub limit: Option<u64>,
    /// Whether more items are available after this page.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Create a new page from items and pagination info.
    #[must_use]
    pub fn new(items: Vec<T>, offset: u64, limit: Option<u64>, total_count: Option<u64>) -> Self {
        let has_more = match total_count {
            Some(total) => offset + (items.len() as u64) < total,
            None => false,
        };
        Self {
            items,
            total_count,
            offset,
            limit,
            has_more,
        }
    }

    /// A page holding a complete, unpaginated collection.
    #[must_use]
    pub fn complete(items: Vec<T>) -> Self {
        let total = items.len() as u64;
        Self::new(items, 0, None, Some(total))
    }

    /// Decode a `{"<plural>": [...], "total_count": n, ...}` response body.
    pub fn from_body(spec: &ResourceSpec, mut body: Map<String, Value>) -> Result<Self>
    where
        T: serde::de::DeserializeOwned,
    {
        let items = spec.unwrap_many(&mut body)?;
        let meta: ListMeta = serde_json::from_value(Value::Object(body))?;
        Ok(Self::new(
            items,
            meta.offset.unwrap_or(0),
            meta.limit,
            meta.total_count,
        ))
    }

    /// Offset at which the next page starts.
    pub fn next_offset(&self) -> u64 {
        self.offset + self.items.len() as u64
    }

    /// Map the items to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            offset: self.offset,
            limit: self.limit,
            has_more: self.has_more,
        }
    }

    /// Returns true if this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns an iterator over the items in this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// List metadata Redmine reports beside the collection.
#[derive(Debug, Default, Deserialize)]
struct ListMeta {
    #[serde(default)]
    total_count: Option<u64>,
    #[serde(default)]
    offset: Option<u64>,
    #[serde(default)]
    limit: Option<u64>,
}

/// Offset/limit window for paginated list requests.
///
/// Flattened into every paginated list query; unset fields leave the
/// service defaults in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    /// Number of items to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    /// Number of items per page (the service caps this at 100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl PaginationParams {
    /// Window starting at `offset` with `limit` items.
    #[must_use]
    pub fn window(offset: u32, limit: u32) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
        }
    }

    /// First page with `limit` items.
    #[must_use]
    pub fn limit(limit: u32) -> Self {
        Self {
            offset: None,
            limit: Some(limit),
        }
    }
}

/// List queries that carry a [`PaginationParams`] window.
pub trait Paginated {
    /// Mutable access to the window, used to walk pages.
    fn pagination_mut(&mut self) -> &mut PaginationParams;
}
