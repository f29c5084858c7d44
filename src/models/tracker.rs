//! Tracker model (read-only).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::RedmineClient;
use crate::context::RequestContext;
use crate::error::Result;
use crate::models::common::NamedRef;
use crate::models::rest;
use crate::pagination::Page;
use crate::resource::{self, Resource, ResourceSpec};
use crate::traits::List;

/// An issue type such as Bug, Feature or Support.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tracker {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub default_status: Option<NamedRef>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Resource for Tracker {
    const SPEC: &'static ResourceSpec = &resource::TRACKER;
}

#[async_trait]
impl List for Tracker {
    type Query = ();

    /// Trackers are not paginated; the page holds every tracker.
    #[tracing::instrument(skip(client, ctx))]
    async fn list(client: &RedmineClient, ctx: &RequestContext, query: &()) -> Result<Page<Self>> {
        rest::fetch_page(client, ctx, "trackers.json", query).await
    }
}
