//! Time entry model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::RedmineClient;
use crate::context::RequestContext;
use crate::error::{RedmineError, Result};
use crate::models::common::{CustomField, CustomFieldValue, NamedRef};
use crate::models::issue::IssueParent;
use crate::models::rest;
use crate::pagination::{Page, Paginated, PaginationParams};
use crate::resource::{self, Resource, ResourceSpec};
use crate::traits::{Create, Delete, List, Show, Update};

/// Hours logged against a project or issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: u64,
    pub project: NamedRef,
    #[serde(default)]
    pub issue: Option<IssueParent>,
    pub user: NamedRef,
    pub activity: NamedRef,
    pub hours: f64,
    #[serde(default)]
    pub comments: String,
    pub spent_on: NaiveDate,
    #[serde(default)]
    pub custom_fields: Vec<CustomFieldValue>,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_on: Option<DateTime<Utc>>,
}

impl Resource for TimeEntry {
    const SPEC: &'static ResourceSpec = &resource::TIME_ENTRY;
}

/// Query parameters for listing time entries.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimeEntryListQuery {
    /// Project id or identifier.
    pub project_id: Option<String>,
    pub issue_id: Option<u64>,
    /// A user id or `me`.
    pub user_id: Option<String>,
    pub activity_id: Option<u64>,
    /// Exact day or operator expression.
    pub spent_on: Option<String>,
    /// Inclusive lower bound (`YYYY-MM-DD`).
    pub from: Option<String>,
    /// Inclusive upper bound (`YYYY-MM-DD`).
    pub to: Option<String>,
    pub sort: Option<String>,

    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl Paginated for TimeEntryListQuery {
    fn pagination_mut(&mut self) -> &mut PaginationParams {
        &mut self.pagination
    }
}

/// Parameters for logging time. Either `issue_id` or `project_id` is required.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimeEntryCreate {
    pub hours: f64,
    pub activity_id: Option<u64>,
    pub issue_id: Option<u64>,
    pub project_id: Option<u64>,
    /// Defaults to today on the server.
    pub spent_on: Option<NaiveDate>,
    pub comments: Option<String>,
    /// Log on behalf of another user (requires permission).
    pub user_id: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_fields: Vec<CustomField>,
}

impl TimeEntryCreate {
    /// Time logged against an issue.
    pub fn on_issue(issue_id: u64, hours: f64) -> Self {
        Self {
            hours,
            issue_id: Some(issue_id),
            ..Default::default()
        }
    }

    /// Time logged against a project.
    pub fn on_project(project_id: u64, hours: f64) -> Self {
        Self {
            hours,
            project_id: Some(project_id),
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.issue_id.is_none() && self.project_id.is_none() {
            return Err(RedmineError::invalid(
                "time entry needs an issue_id or a project_id",
            ));
        }
        Ok(())
    }
}

/// Parameters for updating a time entry. Unset fields are left unchanged.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimeEntryUpdate {
    pub hours: Option<f64>,
    pub activity_id: Option<u64>,
    pub issue_id: Option<u64>,
    pub project_id: Option<u64>,
    pub spent_on: Option<NaiveDate>,
    pub comments: Option<String>,
    pub user_id: Option<u64>,
    pub custom_fields: Option<Vec<CustomField>>,
}

fn time_entry_path(id: u64) -> String {
    format!("time_entries/{id}.json")
}

#[async_trait]
impl List for TimeEntry {
    type Query = TimeEntryListQuery;

    #[tracing::instrument(skip(client, ctx))]
    async fn list(
        client: &RedmineClient,
        ctx: &RequestContext,
        query: &Self::Query,
    ) -> Result<Page<Self>> {
        rest::fetch_page(client, ctx, "time_entries.json", query).await
    }
}

#[async_trait]
impl Show for TimeEntry {
    type Id = u64;
    type Query = ();

    #[tracing::instrument(skip(client, ctx))]
    async fn show(client: &RedmineClient, ctx: &RequestContext, id: u64, query: &()) -> Result<Self> {
        rest::fetch_one(client, ctx, &time_entry_path(id), query).await
    }
}

#[async_trait]
impl Create for TimeEntry {
    type Params = TimeEntryCreate;

    #[tracing::instrument(skip(client, ctx, params), fields(hours = params.hours))]
    async fn create(
        client: &RedmineClient,
        ctx: &RequestContext,
        params: &TimeEntryCreate,
    ) -> Result<Self> {
        params.validate()?;
        rest::create_one(client, ctx, "time_entries.json", params).await
    }
}

#[async_trait]
impl Update for TimeEntry {
    type Id = u64;
    type Params = TimeEntryUpdate;

    #[tracing::instrument(skip(client, ctx, params))]
    async fn update(
        client: &RedmineClient,
        ctx: &RequestContext,
        id: u64,
        params: &TimeEntryUpdate,
    ) -> Result<()> {
        rest::update_one(Self::SPEC, client, ctx, &time_entry_path(id), params).await
    }
}

#[async_trait]
impl Delete for TimeEntry {
    type Id = u64;

    #[tracing::instrument(skip(client, ctx))]
    async fn delete(client: &RedmineClient, ctx: &RequestContext, id: u64) -> Result<()> {
        client.delete(ctx, &time_entry_path(id)).await
    }
}
