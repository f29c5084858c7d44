//! News model and operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::RedmineClient;
use crate::context::RequestContext;
use crate::error::Result;
use crate::models::attachment::Attachment;
use crate::models::common::{NamedRef, ProjectRef, ShowQuery};
use crate::models::rest;
use crate::pagination::{Page, Paginated, PaginationParams};
use crate::resource::{self, Resource, ResourceSpec};
use crate::traits::{List, Show};

/// A news item published in a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct News {
    pub id: u64,
    pub project: NamedRef,
    pub author: NamedRef,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub comments: Vec<NewsComment>,
}

/// A comment on a news item (`include=comments`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsComment {
    pub id: u64,
    pub author: NamedRef,
    #[serde(default)]
    pub content: Option<String>,
}

impl Resource for News {
    const SPEC: &'static ResourceSpec = &resource::NEWS;
}

/// Query parameters for listing news, instance-wide or for one project.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewsListQuery {
    /// Restrict to one project; `None` lists news across all visible projects.
    #[serde(skip)]
    pub project: Option<ProjectRef>,

    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl NewsListQuery {
    /// News of a single project.
    pub fn for_project(project: impl Into<ProjectRef>) -> Self {
        Self {
            project: Some(project.into()),
            ..Default::default()
        }
    }

    fn path(&self) -> String {
        match &self.project {
            Some(project) => format!("projects/{}/news.json", project.path_segment()),
            None => "news.json".to_string(),
        }
    }
}

impl Paginated for NewsListQuery {
    fn pagination_mut(&mut self) -> &mut PaginationParams {
        &mut self.pagination
    }
}

#[async_trait]
impl List for News {
    type Query = NewsListQuery;

    #[tracing::instrument(skip(client, ctx))]
    async fn list(
        client: &RedmineClient,
        ctx: &RequestContext,
        query: &Self::Query,
    ) -> Result<Page<Self>> {
        rest::fetch_page(client, ctx, &query.path(), query).await
    }
}

#[async_trait]
impl Show for News {
    type Id = u64;
    type Query = ShowQuery;

    #[tracing::instrument(skip(client, ctx))]
    async fn show(
        client: &RedmineClient,
        ctx: &RequestContext,
        id: u64,
        query: &ShowQuery,
    ) -> Result<Self> {
        rest::fetch_one(client, ctx, &format!("news/{id}.json"), query).await
    }
}
