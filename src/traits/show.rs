//! Show trait for fetching single entities.

use async_trait::async_trait;

use crate::client::RedmineClient;
use crate::context::RequestContext;
use crate::error::Result;

/// Fetch a single entity by ID.
///
/// Implement this trait for entity types that can be fetched individually,
/// by numeric id or, where the service allows it, by a string identifier.
///
/// # Example
///
/// ```ignore
/// use redmine_api::{Issue, RedmineClient, RequestContext, Show, ShowQuery};
///
/// let client = RedmineClient::new("https://redmine.example.com", "key")?;
/// let issue = Issue::show(&client, &RequestContext::new(), 42, &ShowQuery::include("journals")).await?;
/// ```
#[async_trait]
pub trait Show: Sized {
    /// The ID type for this entity.
    type Id: Send + Sync;

    /// Options applied to the request (include expansions, version).
    type Query: Send + Sync;

    /// Fetch the entity by ID.
    ///
    /// # Arguments
    ///
    /// * `client` - The Redmine API client
    /// * `ctx` - Cancellation and deadline for this call
    /// * `id` - The entity identifier
    /// * `query` - Show options
    ///
    /// # Errors
    ///
    /// Returns [`RedmineError::NotFound`](crate::RedmineError::NotFound) if
    /// the entity does not exist, or any other error from the request.
    async fn show(
        client: &RedmineClient,
        ctx: &RequestContext,
        id: Self::Id,
        query: &Self::Query,
    ) -> Result<Self>;
}
