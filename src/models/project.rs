//! Project model and trait implementations.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::RedmineClient;
use crate::context::RequestContext;
use crate::error::{RedmineError, Result};
use crate::models::common::{CustomField, CustomFieldValue, NamedRef, ProjectRef, ShowQuery};
use crate::models::rest;
use crate::pagination::{Page, Paginated, PaginationParams};
use crate::resource::{self, Resource, ResourceSpec};
use crate::traits::{Create, Delete, List, Show, Update};

/// A Redmine project.
///
/// Projects are the top-level containers for issues, wiki pages, news and
/// time entries. They are addressed either by numeric id or by their
/// `identifier` (see [`ProjectRef`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    /// URL-safe identifier, unique across the instance.
    pub identifier: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub parent: Option<NamedRef>,
    /// `None` when the server reports a status code this crate does not know.
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub inherit_members: bool,
    #[serde(default)]
    pub custom_fields: Vec<CustomFieldValue>,

    // Include expansions
    #[serde(default)]
    pub trackers: Vec<NamedRef>,
    #[serde(default)]
    pub issue_categories: Vec<NamedRef>,
    #[serde(default)]
    pub enabled_modules: Vec<NamedRef>,
    #[serde(default)]
    pub time_entry_activities: Vec<NamedRef>,
    #[serde(default)]
    pub issue_custom_fields: Vec<NamedRef>,

    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_on: Option<DateTime<Utc>>,
}

impl Project {
    /// Check if the project is archived.
    pub fn is_archived(&self) -> bool {
        self.status == Some(ProjectStatus::Archived)
    }

    /// This project as a path reference.
    pub fn reference(&self) -> ProjectRef {
        ProjectRef::Id(self.id)
    }

    /// Archive the project. Archived projects are hidden and read-only.
    #[tracing::instrument(skip(client, ctx))]
    pub async fn archive(
        client: &RedmineClient,
        ctx: &RequestContext,
        project: &ProjectRef,
    ) -> Result<()> {
        let path = format!("projects/{}/archive.json", project.path_segment());
        client
            .execute_empty(ctx, Method::PUT, &path, "", None::<&()>)
            .await
    }

    /// Restore an archived project.
    #[tracing::instrument(skip(client, ctx))]
    pub async fn unarchive(
        client: &RedmineClient,
        ctx: &RequestContext,
        project: &ProjectRef,
    ) -> Result<()> {
        let path = format!("projects/{}/unarchive.json", project.path_segment());
        client
            .execute_empty(ctx, Method::PUT, &path, "", None::<&()>)
            .await
    }
}

impl Resource for Project {
    const SPEC: &'static ResourceSpec = &resource::PROJECT;
}

/// Lifecycle status of a project (`1`, `5`, `9` or `10` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ProjectStatus {
    Active,
    Closed,
    Archived,
    /// Set by Redmine 5.1+ while a deletion job is pending.
    ScheduledForDeletion,
}

fn lenient_status<'de, D>(deserializer: D) -> std::result::Result<Option<ProjectStatus>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let code = Option::<u8>::deserialize(deserializer)?;
    Ok(code.and_then(|code| match ProjectStatus::try_from(code) {
        Ok(status) => Some(status),
        Err(_) => {
            tracing::debug!(code, "ignoring unknown project status");
            None
        }
    }))
}

impl From<ProjectStatus> for u8 {
    fn from(status: ProjectStatus) -> Self {
        match status {
            ProjectStatus::Active => 1,
            ProjectStatus::Closed => 5,
            ProjectStatus::Archived => 9,
            ProjectStatus::ScheduledForDeletion => 10,
        }
    }
}

impl TryFrom<u8> for ProjectStatus {
    type Error = RedmineError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            1 => Ok(ProjectStatus::Active),
            5 => Ok(ProjectStatus::Closed),
            9 => Ok(ProjectStatus::Archived),
            10 => Ok(ProjectStatus::ScheduledForDeletion),
            other => Err(RedmineError::invalid(format!(
                "unknown project status {other}"
            ))),
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = RedmineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "active" | "1" => Ok(ProjectStatus::Active),
            "closed" | "5" => Ok(ProjectStatus::Closed),
            "archived" | "9" => Ok(ProjectStatus::Archived),
            "scheduled_for_deletion" | "10" => Ok(ProjectStatus::ScheduledForDeletion),
            _ => Err(RedmineError::invalid(format!(
                "unknown project status '{s}'; expected active, closed or archived"
            ))),
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Closed => "closed",
            ProjectStatus::Archived => "archived",
            ProjectStatus::ScheduledForDeletion => "scheduled for deletion",
        };
        f.write_str(s)
    }
}

/// Query parameters for listing projects.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectListQuery {
    /// Filter by status.
    pub status: Option<ProjectStatus>,

    /// Comma-separated include tokens.
    pub include: Option<String>,

    /// Sort order (e.g. `name:asc`).
    pub sort: Option<String>,

    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl Paginated for ProjectListQuery {
    fn pagination_mut(&mut self) -> &mut PaginationParams {
        &mut self.pagination
    }
}

/// Parameters for creating a project.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectCreate {
    pub name: String,
    pub identifier: String,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub is_public: Option<bool>,
    pub parent_id: Option<u64>,
    pub inherit_members: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tracker_ids: Vec<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enabled_module_names: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_fields: Vec<CustomField>,
}

/// Parameters for updating a project. Unset fields are left unchanged.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub is_public: Option<bool>,
    pub parent_id: Option<u64>,
    pub inherit_members: Option<bool>,
    pub tracker_ids: Option<Vec<u64>>,
    pub enabled_module_names: Option<Vec<String>>,
    pub custom_fields: Option<Vec<CustomField>>,
}

fn project_path(project: &ProjectRef) -> String {
    format!("projects/{}.json", project.path_segment())
}

#[async_trait]
impl List for Project {
    type Query = ProjectListQuery;

    #[tracing::instrument(skip(client, ctx))]
    async fn list(
        client: &RedmineClient,
        ctx: &RequestContext,
        query: &Self::Query,
    ) -> Result<Page<Self>> {
        rest::fetch_page(client, ctx, "projects.json", query).await
    }
}

#[async_trait]
impl Show for Project {
    type Id = ProjectRef;
    type Query = ShowQuery;

    #[tracing::instrument(skip(client, ctx))]
    async fn show(
        client: &RedmineClient,
        ctx: &RequestContext,
        id: ProjectRef,
        query: &ShowQuery,
    ) -> Result<Self> {
        rest::fetch_one(client, ctx, &project_path(&id), query).await
    }
}

#[async_trait]
impl Create for Project {
    type Params = ProjectCreate;

    #[tracing::instrument(skip(client, ctx, params), fields(identifier = %params.identifier))]
    async fn create(
        client: &RedmineClient,
        ctx: &RequestContext,
        params: &ProjectCreate,
    ) -> Result<Self> {
        rest::create_one(client, ctx, "projects.json", params).await
    }
}

#[async_trait]
impl Update for Project {
    type Id = ProjectRef;
    type Params = ProjectUpdate;

    #[tracing::instrument(skip(client, ctx, params))]
    async fn update(
        client: &RedmineClient,
        ctx: &RequestContext,
        id: ProjectRef,
        params: &ProjectUpdate,
    ) -> Result<()> {
        rest::update_one(Self::SPEC, client, ctx, &project_path(&id), params).await
    }
}

#[async_trait]
impl Delete for Project {
    type Id = ProjectRef;

    #[tracing::instrument(skip(client, ctx))]
    async fn delete(client: &RedmineClient, ctx: &RequestContext, id: ProjectRef) -> Result<()> {
        client.delete(ctx, &project_path(&id)).await
    }
}
