//! Update trait for modifying entities.

use async_trait::async_trait;

use crate::client::RedmineClient;
use crate::context::RequestContext;
use crate::error::Result;

/// Update an existing entity.
///
/// Implement this trait for entity types that can be modified after
/// creation. The service answers with an empty body, so nothing is returned
/// on success; fetch the entity again with [`Show`](crate::Show) if needed.
///
/// # Example
///
/// ```ignore
/// use redmine_api::{Issue, IssueUpdate, RedmineClient, RequestContext, Update};
///
/// let client = RedmineClient::new("https://redmine.example.com", "key")?;
/// Issue::update(
///     &client,
///     &RequestContext::new(),
///     42,
///     &IssueUpdate {
///         done_ratio: Some(0),
///         ..Default::default()
///     },
/// ).await?;
/// ```
#[async_trait]
pub trait Update {
    /// The ID type for this entity.
    type Id: Send + Sync;

    /// Parameters for the update.
    type Params: Send + Sync;

    /// Apply the update.
    ///
    /// # Arguments
    ///
    /// * `client` - The Redmine API client
    /// * `ctx` - Cancellation and deadline for this call
    /// * `id` - The entity identifier
    /// * `params` - Fields to change; unset fields are left untouched
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found, the payload is rejected,
    /// or the request fails.
    async fn update(
        client: &RedmineClient,
        ctx: &RequestContext,
        id: Self::Id,
        params: &Self::Params,
    ) -> Result<()>;
}
