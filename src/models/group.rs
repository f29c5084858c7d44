//! Group model and trait implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::skip_serializing_none;

use crate::client::RedmineClient;
use crate::context::RequestContext;
use crate::error::Result;
use crate::models::common::{CustomField, CustomFieldValue, Membership, NamedRef, ShowQuery};
use crate::models::rest;
use crate::pagination::{Page, Paginated, PaginationParams};
use crate::resource::{self, Resource, ResourceSpec};
use crate::traits::{Create, Delete, List, Show, Update};

/// A named group of users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub custom_fields: Vec<CustomFieldValue>,
    #[serde(default)]
    pub users: Vec<NamedRef>,
    #[serde(default)]
    pub memberships: Vec<Membership>,
}

impl Resource for Group {
    const SPEC: &'static ResourceSpec = &resource::GROUP;
}

/// Query parameters for listing groups.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupListQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

impl Paginated for GroupListQuery {
    fn pagination_mut(&mut self) -> &mut PaginationParams {
        &mut self.pagination
    }
}

/// Parameters for creating a group.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub user_ids: Vec<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_fields: Vec<CustomField>,
}

/// Parameters for updating a group.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupUpdate {
    pub name: Option<String>,
    /// Replaces the full member list when set.
    pub user_ids: Option<Vec<u64>>,
    pub custom_fields: Option<Vec<CustomField>>,
}

impl Group {
    /// Add a user to the group.
    #[tracing::instrument(skip(client, ctx))]
    pub async fn add_user(
        client: &RedmineClient,
        ctx: &RequestContext,
        group_id: u64,
        user_id: u64,
    ) -> Result<()> {
        let path = format!("groups/{group_id}/users.json");
        client
            .post_empty(ctx, &path, &json!({ "user_id": user_id }))
            .await
    }

    /// Remove a user from the group.
    #[tracing::instrument(skip(client, ctx))]
    pub async fn remove_user(
        client: &RedmineClient,
        ctx: &RequestContext,
        group_id: u64,
        user_id: u64,
    ) -> Result<()> {
        client
            .delete(ctx, &format!("groups/{group_id}/users/{user_id}.json"))
            .await
    }
}

fn group_path(id: u64) -> String {
    format!("groups/{id}.json")
}

#[async_trait]
impl List for Group {
    type Query = GroupListQuery;

    #[tracing::instrument(skip(client, ctx))]
    async fn list(
        client: &RedmineClient,
        ctx: &RequestContext,
        query: &Self::Query,
    ) -> Result<Page<Self>> {
        rest::fetch_page(client, ctx, "groups.json", query).await
    }
}

#[async_trait]
impl Show for Group {
    type Id = u64;
    type Query = ShowQuery;

    #[tracing::instrument(skip(client, ctx))]
    async fn show(
        client: &RedmineClient,
        ctx: &RequestContext,
        id: u64,
        query: &ShowQuery,
    ) -> Result<Self> {
        rest::fetch_one(client, ctx, &group_path(id), query).await
    }
}

#[async_trait]
impl Create for Group {
    type Params = GroupCreate;

    #[tracing::instrument(skip(client, ctx, params), fields(name = %params.name))]
    async fn create(client: &RedmineClient, ctx: &RequestContext, params: &GroupCreate) -> Result<Self> {
        rest::create_one(client, ctx, "groups.json", params).await
    }
}

#[async_trait]
impl Update for Group {
    type Id = u64;
    type Params = GroupUpdate;

    #[tracing::instrument(skip(client, ctx, params))]
    async fn update(
        client: &RedmineClient,
        ctx: &RequestContext,
        id: u64,
        params: &GroupUpdate,
    ) -> Result<()> {
        rest::update_one(Self::SPEC, client, ctx, &group_path(id), params).await
    }
}

#[async_trait]
impl Delete for Group {
    type Id = u64;

    #[tracing::instrument(skip(client, ctx))]
    async fn delete(client: &RedmineClient, ctx: &RequestContext, id: u64) -> Result<()> {
        client.delete(ctx, &group_path(id)).await
    }
}
