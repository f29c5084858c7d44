//! Issue model and trait implementations.
//!
//! Issues are the central work items of a project. Expansions such as
//! journals, attachments, relations and watchers are only populated when
//! requested through `include`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::skip_serializing_none;

use crate::client::RedmineClient;
use crate::context::RequestContext;
use crate::error::Result;
use crate::models::attachment::Attachment;
use crate::models::common::{CustomField, CustomFieldValue, NamedRef, ShowQuery, UploadRef};
use crate::models::journal::Journal;
use crate::models::relation::IssueRelation;
use crate::models::rest;
use crate::pagination::{Page, Paginated, PaginationParams};
use crate::resource::{self, Resource, ResourceSpec};
use crate::traits::{Create, Delete, List, Show, Update};

// =============================================================================
// MODEL
// =============================================================================

/// A Redmine issue.
///
/// # Example
///
/// ```ignore
/// use redmine_api::{Issue, IssueListQuery, List, PaginationParams, RedmineClient, RequestContext};
///
/// let client = RedmineClient::new("https://redmine.example.com", "key")?;
/// let query = IssueListQuery {
///     project_id: Some(5),
///     status_id: Some("open".to_string()),
///     include: Some("journals,attachments".to_string()),
///     pagination: PaginationParams::limit(25),
///     ..Default::default()
/// };
/// let page = Issue::list(&client, &RequestContext::new(), &query).await?;
///
/// for issue in page {
///     println!("#{} [{}] {}", issue.id, issue.status.name, issue.subject);
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub project: NamedRef,
    pub tracker: NamedRef,
    pub status: NamedRef,
    pub priority: NamedRef,
    pub author: NamedRef,
    #[serde(default)]
    pub assigned_to: Option<NamedRef>,
    #[serde(default)]
    pub category: Option<NamedRef>,
    #[serde(default)]
    pub fixed_version: Option<NamedRef>,
    #[serde(default)]
    pub parent: Option<IssueParent>,
    pub subject: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub done_ratio: u8,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub spent_hours: Option<f64>,
    #[serde(default)]
    pub custom_fields: Vec<CustomFieldValue>,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_on: Option<DateTime<Utc>>,

    // Include expansions
    #[serde(default)]
    pub children: Vec<IssueChild>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub relations: Vec<IssueRelation>,
    #[serde(default)]
    pub changesets: Vec<Changeset>,
    #[serde(default)]
    pub journals: Vec<Journal>,
    #[serde(default)]
    pub watchers: Vec<NamedRef>,
    #[serde(default)]
    pub allowed_statuses: Vec<NamedRef>,
}

/// Parent issue reference (`{"id": 12}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueParent {
    pub id: u64,
}

/// Child issue as embedded by `include=children`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueChild {
    pub id: u64,
    #[serde(default)]
    pub tracker: Option<NamedRef>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub children: Vec<IssueChild>,
}

/// Repository changeset linked to an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Changeset {
    pub revision: String,
    #[serde(default)]
    pub user: Option<NamedRef>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub committed_on: Option<DateTime<Utc>>,
}

impl Issue {
    /// Check if the issue has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed_on.is_some()
    }

    /// Name of the assignee, if any.
    pub fn assignee_name(&self) -> Option<&str> {
        self.assigned_to.as_ref().map(|a| a.name.as_str())
    }

    /// Add a user to the issue's watchers.
    #[tracing::instrument(skip(client, ctx))]
    pub async fn add_watcher(
        client: &RedmineClient,
        ctx: &RequestContext,
        issue_id: u64,
        user_id: u64,
    ) -> Result<()> {
        let path = format!("issues/{issue_id}/watchers.json");
        client
            .post_empty(ctx, &path, &json!({ "user_id": user_id }))
            .await
    }

    /// Remove a user from the issue's watchers.
    #[tracing::instrument(skip(client, ctx))]
    pub async fn remove_watcher(
        client: &RedmineClient,
        ctx: &RequestContext,
        issue_id: u64,
        user_id: u64,
    ) -> Result<()> {
        let path = format!("issues/{issue_id}/watchers/{user_id}.json");
        client.delete(ctx, &path).await
    }
}

impl Resource for Issue {
    const SPEC: &'static ResourceSpec = &resource::ISSUE;
}

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// Query parameters for listing issues.
///
/// Date filters (`created_on`, `updated_on`, `closed_on`) accept the
/// service's operator syntax verbatim, e.g. `>=2024-03-01` or
/// `><2024-01-01|2024-01-31`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IssueListQuery {
    pub project_id: Option<u64>,
    /// Subproject filter, e.g. `!*` to exclude all subprojects.
    pub subproject_id: Option<String>,
    pub tracker_id: Option<u64>,
    /// `open`, `closed`, `*` or a status id.
    pub status_id: Option<String>,
    /// A user id or `me`.
    pub assigned_to_id: Option<String>,
    pub parent_id: Option<u64>,
    /// Restrict to these issue ids.
    pub issue_id: Vec<u64>,
    pub created_on: Option<String>,
    pub updated_on: Option<String>,
    pub closed_on: Option<String>,
    pub sort: Option<String>,
    pub include: Option<String>,

    /// Custom field filters keyed `cf_<id>`; see [`IssueListQuery::custom_field`].
    #[serde(flatten)]
    pub custom_fields: BTreeMap<String, String>,

    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl IssueListQuery {
    /// Filter on a custom field value.
    #[must_use]
    pub fn custom_field(mut self, id: u64, value: impl Into<String>) -> Self {
        self.custom_fields.insert(format!("cf_{id}"), value.into());
        self
    }
}

impl Paginated for IssueListQuery {
    fn pagination_mut(&mut self) -> &mut PaginationParams {
        &mut self.pagination
    }
}

/// Parameters for creating an issue.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct IssueCreate {
    pub project_id: u64,
    pub tracker_id: Option<u64>,
    pub status_id: Option<u64>,
    pub priority_id: Option<u64>,
    pub subject: String,
    pub description: Option<String>,
    pub category_id: Option<u64>,
    pub fixed_version_id: Option<u64>,
    pub assigned_to_id: Option<u64>,
    pub parent_issue_id: Option<u64>,
    pub is_private: Option<bool>,
    pub estimated_hours: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub done_ratio: Option<u8>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_fields: Vec<CustomField>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub watcher_user_ids: Vec<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub uploads: Vec<UploadRef>,
}

/// Parameters for updating an issue.
///
/// `None` leaves a field unchanged. Clearable references use a nested
/// option: `Some(None)` sends `null` and clears the value on the server.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct IssueUpdate {
    pub project_id: Option<u64>,
    pub tracker_id: Option<u64>,
    pub status_id: Option<u64>,
    pub priority_id: Option<u64>,
    pub subject: Option<String>,
    pub description: Option<String>,
    #[serde(with = "::serde_with::rust::double_option")]
    pub category_id: Option<Option<u64>>,
    #[serde(with = "::serde_with::rust::double_option")]
    pub fixed_version_id: Option<Option<u64>>,
    #[serde(with = "::serde_with::rust::double_option")]
    pub assigned_to_id: Option<Option<u64>>,
    #[serde(with = "::serde_with::rust::double_option")]
    pub parent_issue_id: Option<Option<u64>>,
    #[serde(with = "::serde_with::rust::double_option")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(with = "::serde_with::rust::double_option")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(with = "::serde_with::rust::double_option")]
    pub estimated_hours: Option<Option<f64>>,
    pub done_ratio: Option<u8>,
    pub is_private: Option<bool>,
    pub custom_fields: Option<Vec<CustomField>>,
    pub watcher_user_ids: Option<Vec<u64>>,
    /// Journal note added with this change.
    pub notes: Option<String>,
    pub private_notes: Option<bool>,
    pub uploads: Option<Vec<UploadRef>>,
}

fn issue_path(id: u64) -> String {
    format!("issues/{id}.json")
}

// =============================================================================
// TRAIT IMPLEMENTATIONS
// =============================================================================

#[async_trait]
impl List for Issue {
    type Query = IssueListQuery;

    #[tracing::instrument(skip(client, ctx))]
    async fn list(
        client: &RedmineClient,
        ctx: &RequestContext,
        query: &Self::Query,
    ) -> Result<Page<Self>> {
        rest::fetch_page(client, ctx, "issues.json", query).await
    }
}

#[async_trait]
impl Show for Issue {
    type Id = u64;
    type Query = ShowQuery;

    #[tracing::instrument(skip(client, ctx))]
    async fn show(
        client: &RedmineClient,
        ctx: &RequestContext,
        id: u64,
        query: &ShowQuery,
    ) -> Result<Self> {
        rest::fetch_one(client, ctx, &issue_path(id), query).await
    }
}

#[async_trait]
impl Create for Issue {
    type Params = IssueCreate;

    #[tracing::instrument(skip(client, ctx, params), fields(project_id = params.project_id))]
    async fn create(
        client: &RedmineClient,
        ctx: &RequestContext,
        params: &IssueCreate,
    ) -> Result<Self> {
        rest::create_one(client, ctx, "issues.json", params).await
    }
}

#[async_trait]
impl Update for Issue {
    type Id = u64;
    type Params = IssueUpdate;

    #[tracing::instrument(skip(client, ctx, params))]
    async fn update(
        client: &RedmineClient,
        ctx: &RequestContext,
        id: u64,
        params: &IssueUpdate,
    ) -> Result<()> {
        rest::update_one(Self::SPEC, client, ctx, &issue_path(id), params).await
    }
}

#[async_trait]
impl Delete for Issue {
    type Id = u64;

    #[tracing::instrument(skip(client, ctx))]
    async fn delete(client: &RedmineClient, ctx: &RequestContext, id: u64) -> Result<()> {
        client.delete(ctx, &issue_path(id)).await
    }
}

// =============================================================================
// CONVENIENCE FUNCTIONS
// =============================================================================

/// Fetch all issues matching a query.
///
/// # Example
///
/// ```ignore
/// use redmine_api::{get_issues, IssueListQuery, RedmineClient, RequestContext};
///
/// let client = RedmineClient::new("https://redmine.example.com", "key")?;
/// let query = IssueListQuery {
///     assigned_to_id: Some("me".to_string()),
///     ..Default::default()
/// };
/// let issues = get_issues(&client, &RequestContext::new(), &query).await?;
/// ```
pub async fn get_issues(
    client: &RedmineClient,
    ctx: &RequestContext,
    query: &IssueListQuery,
) -> Result<Vec<Issue>> {
    crate::traits::list_all::<Issue>(client, ctx, query).await
}
