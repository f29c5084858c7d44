//! Journal (issue history) model.
//!
//! Journals are read-only and only reachable through their issue: the list
//! operation fetches `issues/{id}.json?include=journals` and returns the
//! embedded entries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::RedmineClient;
use crate::context::RequestContext;
use crate::error::Result;
use crate::models::common::{NamedRef, ShowQuery};
use crate::models::issue::Issue;
use crate::pagination::Page;
use crate::resource::{self, Resource, ResourceSpec};
use crate::traits::{List, Show};

/// One entry in an issue's history: a note, a set of attribute changes, or both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journal {
    pub id: u64,
    #[serde(default)]
    pub user: Option<NamedRef>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub private_notes: bool,
    #[serde(default)]
    pub details: Vec<JournalDetail>,
}

impl Journal {
    /// Check if this entry carries a non-empty note.
    pub fn has_notes(&self) -> bool {
        self.notes.as_deref().is_some_and(|n| !n.trim().is_empty())
    }
}

/// A single attribute change recorded by a journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalDetail {
    /// `attr`, `cf`, `attachment` or `relation`.
    pub property: String,
    pub name: String,
    #[serde(default)]
    pub old_value: Option<String>,
    #[serde(default)]
    pub new_value: Option<String>,
}

impl Resource for Journal {
    const SPEC: &'static ResourceSpec = &resource::JOURNAL;
}

/// Query for listing the journals of one issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalListQuery {
    pub issue_id: u64,
}

impl JournalListQuery {
    pub fn new(issue_id: u64) -> Self {
        Self { issue_id }
    }
}

#[async_trait]
impl List for Journal {
    type Query = JournalListQuery;

    #[tracing::instrument(skip(client, ctx))]
    async fn list(
        client: &RedmineClient,
        ctx: &RequestContext,
        query: &Self::Query,
    ) -> Result<Page<Self>> {
        let issue = Issue::show(client, ctx, query.issue_id, &ShowQuery::include("journals")).await?;
        Ok(Page::complete(issue.journals))
    }
}
