//! Wiki page model and operations.
//!
//! Pages are addressed by project and title. Writes go through a single
//! upsert: the service creates the page if it does not exist and updates it
//! otherwise. Passing the `version` that was last read turns the write into
//! an optimistic-concurrency check; a stale version yields
//! [`RedmineError::Conflict`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;

use crate::client::{endpoint, RedmineClient};
use crate::context::RequestContext;
use crate::error::{RedmineError, Result};
use crate::models::attachment::Attachment;
use crate::models::common::{NamedRef, ProjectRef, UploadRef};
use crate::models::rest;
use crate::pagination::Page;
use crate::resource::{self, Resource, ResourceSpec};
use crate::traits::{Delete, List, Show};

/// A wiki page, or an entry of the wiki index (which carries no text).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiPage {
    pub title: String,
    #[serde(default)]
    pub parent: Option<WikiParent>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub author: Option<NamedRef>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Parent page reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiParent {
    pub title: String,
}

impl Resource for WikiPage {
    const SPEC: &'static ResourceSpec = &resource::WIKI_PAGE;
}

/// Identifies one page: project plus title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiPageId {
    pub project: ProjectRef,
    pub title: String,
}

impl WikiPageId {
    pub fn new(project: impl Into<ProjectRef>, title: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            title: title.into(),
        }
    }

    fn path(&self, version: Option<u32>) -> Result<String> {
        if self.title.trim().is_empty() {
            return Err(RedmineError::invalid("wiki page title must not be empty"));
        }
        // Dot segments would be collapsed by URL resolution
        if matches!(self.title.as_str(), "." | "..") {
            return Err(RedmineError::invalid(format!(
                "'{}' is not a valid wiki page title",
                self.title
            )));
        }
        let base = format!(
            "projects/{}/wiki/{}",
            self.project.path_segment(),
            urlencoding::encode(&self.title)
        );
        Ok(match version {
            Some(version) => format!("{base}/{version}.json"),
            None => format!("{base}.json"),
        })
    }
}

/// Query for the wiki index of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WikiPageListQuery {
    #[serde(skip)]
    pub project: ProjectRef,
}

impl WikiPageListQuery {
    pub fn new(project: impl Into<ProjectRef>) -> Self {
        Self {
            project: project.into(),
        }
    }
}

/// Options for fetching one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WikiShowQuery {
    pub include: Option<String>,
    /// Fetch this historical version instead of the current one.
    #[serde(skip)]
    pub version: Option<u32>,
}

/// Content for creating or updating a page.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct WikiPageWrite {
    pub text: String,
    /// Change summary recorded in the page history.
    pub comments: Option<String>,
    /// Version the edit is based on; omit to skip the concurrency check.
    pub version: Option<u32>,
    pub parent_title: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub uploads: Vec<UploadRef>,
}

/// Outcome of [`WikiPage::create_or_update`].
#[derive(Debug, Clone)]
pub enum WikiUpsert {
    /// The page did not exist and was created.
    Created(WikiPage),
    /// An existing page received a new version.
    Updated,
}

impl WikiPage {
    /// Create the page if missing, otherwise store a new version.
    ///
    /// # Errors
    ///
    /// Returns [`RedmineError::Conflict`] when `page.version` is set and the
    /// stored page has moved past it. The write is not retried.
    #[tracing::instrument(skip(client, ctx, page), fields(version = page.version))]
    pub async fn create_or_update(
        client: &RedmineClient,
        ctx: &RequestContext,
        id: &WikiPageId,
        page: &WikiPageWrite,
    ) -> Result<WikiUpsert> {
        let path = id.path(None)?;
        let envelope = Self::SPEC.wrap(page)?;
        let created: Option<Map<String, Value>> = client
            .execute_optional(ctx, Method::PUT, &path, "", Some(&envelope))
            .await?;

        match created {
            Some(body) => Self::SPEC
                .unwrap_one(body)
                .map(WikiUpsert::Created)
                .map_err(|e| e.at_endpoint(&endpoint(&Method::PUT, &path))),
            None => Ok(WikiUpsert::Updated),
        }
    }
}

#[async_trait]
impl List for WikiPage {
    type Query = WikiPageListQuery;

    #[tracing::instrument(skip(client, ctx))]
    async fn list(
        client: &RedmineClient,
        ctx: &RequestContext,
        query: &Self::Query,
    ) -> Result<Page<Self>> {
        let path = format!("projects/{}/wiki/index.json", query.project.path_segment());
        rest::fetch_page(client, ctx, &path, query).await
    }
}

#[async_trait]
impl Show for WikiPage {
    type Id = WikiPageId;
    type Query = WikiShowQuery;

    #[tracing::instrument(skip(client, ctx))]
    async fn show(
        client: &RedmineClient,
        ctx: &RequestContext,
        id: WikiPageId,
        query: &WikiShowQuery,
    ) -> Result<Self> {
        let path = id.path(query.version)?;
        rest::fetch_one(client, ctx, &path, query).await
    }
}

#[async_trait]
impl Delete for WikiPage {
    type Id = WikiPageId;

    #[tracing::instrument(skip(client, ctx))]
    async fn delete(client: &RedmineClient, ctx: &RequestContext, id: WikiPageId) -> Result<()> {
        client.delete(ctx, &id.path(None)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query;
    use serde_json::json;

    #[test]
    fn test_wiki_page_paths() {
        let id = WikiPageId::new("docs", "Getting Started");
        assert_eq!(
            id.path(None).unwrap(),
            "projects/docs/wiki/Getting%20Started.json"
        );
        assert_eq!(
            id.path(Some(3)).unwrap(),
            "projects/docs/wiki/Getting%20Started/3.json"
        );
        assert!(WikiPageId::new(1, " ").path(None).is_err());
    }

    #[test]
    fn test_dot_titles_rejected() {
        for title in [".", ".."] {
            let err = WikiPageId::new("docs", title).path(Some(3)).unwrap_err();
            assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);
        }
        assert_eq!(
            WikiPageId::new("docs", "v1.2").path(None).unwrap(),
            "projects/docs/wiki/v1.2.json"
        );
    }

    #[test]
    fn test_wiki_page_deserialize() {
        let page: WikiPage = serde_json::from_value(json!({
            "title": "Home",
            "parent": {"title": "Index"},
            "text": "h1. Welcome",
            "version": 4,
            "author": {"id": 1, "name": "Admin"},
            "comments": "typo",
            "created_on": "2024-01-01T00:00:00Z",
            "updated_on": "2024-02-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(page.version, Some(4));
        assert_eq!(page.parent.map(|p| p.title), Some("Index".to_string()));
    }

    #[test]
    fn test_wiki_write_without_version() {
        let write = WikiPageWrite {
            text: "h1. Welcome".into(),
            ..Default::default()
        };
        let wrapped = serde_json::to_value(WikiPage::SPEC.wrap(&write).unwrap()).unwrap();
        assert_eq!(wrapped, json!({"wiki_page": {"text": "h1. Welcome"}}));
    }

    #[test]
    fn test_wiki_show_query_version_is_not_a_parameter() {
        let query = WikiShowQuery {
            include: Some("attachments".into()),
            version: Some(2),
        };
        assert_eq!(
            query::encode(WikiPage::SPEC, &query).unwrap(),
            "include=attachments"
        );
    }
}
