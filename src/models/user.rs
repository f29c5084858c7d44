//! User model and trait implementations.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::RedmineClient;
use crate::context::RequestContext;
use crate::error::{RedmineError, Result};
use crate::models::common::{CustomField, CustomFieldValue, Membership, NamedRef, ShowQuery};
use crate::models::rest;
use crate::pagination::{Page, Paginated, PaginationParams};
use crate::resource::{self, Resource, ResourceSpec};
use crate::traits::{Create, Delete, List, Show, Update};

/// A Redmine user account.
///
/// Several fields (`mail`, `api_key`, `last_login_on`) are only visible to
/// administrators or to the user themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub status: Option<UserStatus>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub custom_fields: Vec<CustomFieldValue>,
    #[serde(default)]
    pub memberships: Vec<Membership>,
    #[serde(default)]
    pub groups: Vec<NamedRef>,
}

impl User {
    /// First and last name joined.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname).trim().to_string()
    }
}

impl Resource for User {
    const SPEC: &'static ResourceSpec = &resource::USER;
}

/// Account status (`1`, `2` or `3` on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum UserStatus {
    Active,
    Registered,
    Locked,
}

impl From<UserStatus> for u8 {
    fn from(status: UserStatus) -> Self {
        match status {
            UserStatus::Active => 1,
            UserStatus::Registered => 2,
            UserStatus::Locked => 3,
        }
    }
}

impl TryFrom<u8> for UserStatus {
    type Error = RedmineError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            1 => Ok(UserStatus::Active),
            2 => Ok(UserStatus::Registered),
            3 => Ok(UserStatus::Locked),
            other => Err(RedmineError::invalid(format!("unknown user status {other}"))),
        }
    }
}

impl FromStr for UserStatus {
    type Err = RedmineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "active" | "1" => Ok(UserStatus::Active),
            "registered" | "2" => Ok(UserStatus::Registered),
            "locked" | "3" => Ok(UserStatus::Locked),
            _ => Err(RedmineError::invalid(format!(
                "unknown user status '{s}'; expected active, registered or locked"
            ))),
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UserStatus::Active => "active",
            UserStatus::Registered => "registered",
            UserStatus::Locked => "locked",
        };
        f.write_str(s)
    }
}

/// Which events a user is notified about by email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailNotification {
    All,
    Selected,
    OnlyMyEvents,
    OnlyAssigned,
    OnlyOwner,
    None,
}

impl FromStr for MailNotification {
    type Err = RedmineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(MailNotification::All),
            "selected" => Ok(MailNotification::Selected),
            "only_my_events" => Ok(MailNotification::OnlyMyEvents),
            "only_assigned" => Ok(MailNotification::OnlyAssigned),
            "only_owner" => Ok(MailNotification::OnlyOwner),
            "none" => Ok(MailNotification::None),
            _ => Err(RedmineError::invalid(format!(
                "unknown mail notification option '{s}'"
            ))),
        }
    }
}

/// Query parameters for listing users.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserListQuery {
    pub status: Option<UserStatus>,
    /// Matches login, first name, last name and mail.
    pub name: Option<String>,
    pub group_id: Option<u64>,
    pub sort: Option<String>,

    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl Paginated for UserListQuery {
    fn pagination_mut(&mut self) -> &mut PaginationParams {
        &mut self.pagination
    }
}

/// Parameters for creating a user.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserCreate {
    pub login: String,
    pub password: Option<String>,
    pub firstname: String,
    pub lastname: String,
    pub mail: String,
    pub auth_source_id: Option<u64>,
    pub mail_notification: Option<MailNotification>,
    pub must_change_passwd: Option<bool>,
    pub generate_password: Option<bool>,
    pub admin: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_fields: Vec<CustomField>,
}

/// Parameters for updating a user. Unset fields are left unchanged.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    pub login: Option<String>,
    pub password: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub mail: Option<String>,
    pub auth_source_id: Option<u64>,
    pub mail_notification: Option<MailNotification>,
    pub must_change_passwd: Option<bool>,
    pub admin: Option<bool>,
    pub status: Option<UserStatus>,
    pub custom_fields: Option<Vec<CustomField>>,
}

fn user_path(id: u64) -> String {
    format!("users/{id}.json")
}

#[async_trait]
impl List for User {
    type Query = UserListQuery;

    #[tracing::instrument(skip(client, ctx))]
    async fn list(
        client: &RedmineClient,
        ctx: &RequestContext,
        query: &Self::Query,
    ) -> Result<Page<Self>> {
        rest::fetch_page(client, ctx, "users.json", query).await
    }
}

#[async_trait]
impl Show for User {
    type Id = u64;
    type Query = ShowQuery;

    #[tracing::instrument(skip(client, ctx))]
    async fn show(
        client: &RedmineClient,
        ctx: &RequestContext,
        id: u64,
        query: &ShowQuery,
    ) -> Result<Self> {
        rest::fetch_one(client, ctx, &user_path(id), query).await
    }
}

#[async_trait]
impl Create for User {
    type Params = UserCreate;

    #[tracing::instrument(skip(client, ctx, params), fields(login = %params.login))]
    async fn create(client: &RedmineClient, ctx: &RequestContext, params: &UserCreate) -> Result<Self> {
        rest::create_one(client, ctx, "users.json", params).await
    }
}

#[async_trait]
impl Update for User {
    type Id = u64;
    type Params = UserUpdate;

    #[tracing::instrument(skip(client, ctx, params))]
    async fn update(
        client: &RedmineClient,
        ctx: &RequestContext,
        id: u64,
        params: &UserUpdate,
    ) -> Result<()> {
        rest::update_one(Self::SPEC, client, ctx, &user_path(id), params).await
    }
}

#[async_trait]
impl Delete for User {
    type Id = u64;

    #[tracing::instrument(skip(client, ctx))]
    async fn delete(client: &RedmineClient, ctx: &RequestContext, id: u64) -> Result<()> {
        client.delete(ctx, &user_path(id)).await
    }
}
