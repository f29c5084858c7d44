//! Attachment model, file upload and download.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;

use crate::client::{endpoint, RedmineClient};
use crate::context::RequestContext;
use crate::error::{RedmineError, Result};
use crate::models::common::{NamedRef, UploadRef};
use crate::resource::{self, Resource, ResourceSpec};
use crate::traits::{Delete, Show, Update};

/// A file attached to an issue, wiki page, news item or project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: u64,
    pub filename: String,
    #[serde(default)]
    pub filesize: u64,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Absolute URL of the raw content.
    #[serde(default)]
    pub content_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub author: Option<NamedRef>,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
}

impl Resource for Attachment {
    const SPEC: &'static ResourceSpec = &resource::ATTACHMENT;
}

/// Parameters for renaming or re-describing an attachment.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct AttachmentUpdate {
    pub filename: Option<String>,
    pub description: Option<String>,
}

/// Token returned by `uploads.json`.
#[derive(Debug, Deserialize)]
struct UploadToken {
    token: String,
}

impl Attachment {
    /// Upload raw file content and return a reference to attach on a
    /// subsequent issue or wiki write.
    ///
    /// # Errors
    ///
    /// Returns [`RedmineError::InvalidInput`] if `filename` is blank.
    #[tracing::instrument(skip(client, ctx, bytes), fields(size = bytes.len()))]
    pub async fn upload(
        client: &RedmineClient,
        ctx: &RequestContext,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadRef> {
        if filename.trim().is_empty() {
            return Err(RedmineError::invalid("upload filename must not be empty"));
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("filename", filename)
            .finish();

        let body: Map<String, Value> = client.post_bytes(ctx, "uploads.json", &query, bytes).await?;
        let upload: UploadToken = resource::UPLOAD
            .unwrap_one(body)
            .map_err(|e| e.at_endpoint(&endpoint(&Method::POST, "uploads.json")))?;

        Ok(UploadRef {
            token: upload.token,
            filename: filename.to_string(),
            content_type: None,
            description: None,
        })
    }

    /// Download the attachment's raw content.
    ///
    /// # Errors
    ///
    /// Returns [`RedmineError::InvalidInput`] if the attachment carries no
    /// content URL.
    #[tracing::instrument(skip(self, client, ctx), fields(id = self.id))]
    pub async fn download(&self, client: &RedmineClient, ctx: &RequestContext) -> Result<Vec<u8>> {
        let url = self.content_url.as_deref().ok_or_else(|| {
            RedmineError::invalid(format!("attachment {} has no content URL", self.id))
        })?;
        client.get_bytes(ctx, url).await
    }
}

fn attachment_path(id: u64) -> String {
    format!("attachments/{id}.json")
}

#[async_trait]
impl Show for Attachment {
    type Id = u64;
    type Query = ();

    #[tracing::instrument(skip(client, ctx))]
    async fn show(
        client: &RedmineClient,
        ctx: &RequestContext,
        id: u64,
        query: &(),
    ) -> Result<Self> {
        crate::models::rest::fetch_one(client, ctx, &attachment_path(id), query).await
    }
}

#[async_trait]
impl Update for Attachment {
    type Id = u64;
    type Params = AttachmentUpdate;

    #[tracing::instrument(skip(client, ctx, params))]
    async fn update(
        client: &RedmineClient,
        ctx: &RequestContext,
        id: u64,
        params: &AttachmentUpdate,
    ) -> Result<()> {
        let envelope = Self::SPEC.wrap(params)?;
        client
            .execute_empty(ctx, Method::PATCH, &attachment_path(id), "", Some(&envelope))
            .await
    }
}

#[async_trait]
impl Delete for Attachment {
    type Id = u64;

    #[tracing::instrument(skip(client, ctx))]
    async fn delete(client: &RedmineClient, ctx: &RequestContext, id: u64) -> Result<()> {
        client.delete(ctx, &attachment_path(id)).await
    }
}
