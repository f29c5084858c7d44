//! Issue relation model and trait implementations.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::RedmineClient;
use crate::context::RequestContext;
use crate::error::{RedmineError, Result};
use crate::models::rest;
use crate::pagination::Page;
use crate::resource::{self, Resource, ResourceSpec};
use crate::traits::{Create, Delete, List, Show};

/// A directed link between two issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRelation {
    pub id: u64,
    pub issue_id: u64,
    pub issue_to_id: u64,
    pub relation_type: RelationType,
    /// Delay in days, only meaningful for `precedes` / `follows`.
    #[serde(default)]
    pub delay: Option<i32>,
}

impl Resource for IssueRelation {
    const SPEC: &'static ResourceSpec = &resource::ISSUE_RELATION;
}

/// The kind of relation between two issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    Relates,
    Duplicates,
    Duplicated,
    Blocks,
    Blocked,
    Precedes,
    Follows,
    CopiedTo,
    CopiedFrom,
}

impl RelationType {
    pub const ALL: [RelationType; 9] = [
        RelationType::Relates,
        RelationType::Duplicates,
        RelationType::Duplicated,
        RelationType::Blocks,
        RelationType::Blocked,
        RelationType::Precedes,
        RelationType::Follows,
        RelationType::CopiedTo,
        RelationType::CopiedFrom,
    ];

    /// Wire name of the relation type.
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::Relates => "relates",
            RelationType::Duplicates => "duplicates",
            RelationType::Duplicated => "duplicated",
            RelationType::Blocks => "blocks",
            RelationType::Blocked => "blocked",
            RelationType::Precedes => "precedes",
            RelationType::Follows => "follows",
            RelationType::CopiedTo => "copied_to",
            RelationType::CopiedFrom => "copied_from",
        }
    }

    /// Whether a delay may accompany this relation type.
    pub fn accepts_delay(&self) -> bool {
        matches!(self, RelationType::Precedes | RelationType::Follows)
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationType {
    type Err = RedmineError;

    fn from_str(s: &str) -> Result<Self> {
        RelationType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| RedmineError::invalid(format!("unknown relation type '{s}'")))
    }
}

/// Query for listing the relations of one issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RelationListQuery {
    #[serde(skip)]
    pub issue_id: u64,
}

impl RelationListQuery {
    pub fn new(issue_id: u64) -> Self {
        Self { issue_id }
    }
}

/// Parameters for relating `issue_id` to `issue_to_id`.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct RelationCreate {
    /// Source issue; part of the request path.
    #[serde(skip)]
    pub issue_id: u64,
    pub issue_to_id: u64,
    pub relation_type: RelationType,
    pub delay: Option<i32>,
}

impl RelationCreate {
    pub fn new(issue_id: u64, issue_to_id: u64, relation_type: RelationType) -> Self {
        Self {
            issue_id,
            issue_to_id,
            relation_type,
            delay: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.issue_id == self.issue_to_id {
            return Err(RedmineError::invalid("an issue cannot be related to itself"));
        }
        if self.delay.is_some() && !self.relation_type.accepts_delay() {
            return Err(RedmineError::invalid(format!(
                "delay is only allowed for precedes/follows, not {}",
                self.relation_type
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl List for IssueRelation {
    type Query = RelationListQuery;

    #[tracing::instrument(skip(client, ctx))]
    async fn list(
        client: &RedmineClient,
        ctx: &RequestContext,
        query: &Self::Query,
    ) -> Result<Page<Self>> {
        let path = format!("issues/{}/relations.json", query.issue_id);
        rest::fetch_page(client, ctx, &path, query).await
    }
}

#[async_trait]
impl Show for IssueRelation {
    type Id = u64;
    type Query = ();

    #[tracing::instrument(skip(client, ctx))]
    async fn show(client: &RedmineClient, ctx: &RequestContext, id: u64, query: &()) -> Result<Self> {
        rest::fetch_one(client, ctx, &format!("relations/{id}.json"), query).await
    }
}

#[async_trait]
impl Create for IssueRelation {
    type Params = RelationCreate;

    #[tracing::instrument(skip(client, ctx))]
    async fn create(
        client: &RedmineClient,
        ctx: &RequestContext,
        params: &RelationCreate,
    ) -> Result<Self> {
        params.validate()?;
        let path = format!("issues/{}/relations.json", params.issue_id);
        rest::create_one(client, ctx, &path, params).await
    }
}

#[async_trait]
impl Delete for IssueRelation {
    type Id = u64;

    #[tracing::instrument(skip(client, ctx))]
    async fn delete(client: &RedmineClient, ctx: &RequestContext, id: u64) -> Result<()> {
        client.delete(ctx, &format!("relations/{id}.json")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_relation_type_wire_names() {
        for t in RelationType::ALL {
            let wire = serde_json::to_value(t).unwrap();
            assert_eq!(wire, json!(t.as_str()));
            assert_eq!(t.as_str().parse::<RelationType>().unwrap(), t);
        }
        assert_eq!(RelationType::CopiedTo.as_str(), "copied_to");
    }

    #[test]
    fn test_unknown_relation_type() {
        let err = "causes".parse::<RelationType>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(serde_json::from_value::<RelationType>(json!("causes")).is_err());
    }

    #[test]
    fn test_relation_create_body_excludes_source_issue() {
        let mut params = RelationCreate::new(1, 2, RelationType::Precedes);
        params.delay = Some(3);
        let wrapped = serde_json::to_value(IssueRelation::SPEC.wrap(&params).unwrap()).unwrap();
        assert_eq!(
            wrapped,
            json!({"relation": {"issue_to_id": 2, "relation_type": "precedes", "delay": 3}})
        );
    }

    #[test]
    fn test_relation_create_validation() {
        assert!(RelationCreate::new(4, 4, RelationType::Relates).validate().is_err());

        let mut params = RelationCreate::new(1, 2, RelationType::Blocks);
        params.delay = Some(1);
        assert_eq!(params.validate().unwrap_err().kind(), ErrorKind::InvalidInput);
    }
}
