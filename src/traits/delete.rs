//! Delete trait for removing entities.

use async_trait::async_trait;

use crate::client::RedmineClient;
use crate::context::RequestContext;
use crate::error::Result;

/// Delete an entity.
///
/// Deleting an entity that is already gone surfaces
/// [`RedmineError::NotFound`](crate::RedmineError::NotFound); it is not
/// treated as success.
#[async_trait]
pub trait Delete {
    /// The ID type for this entity.
    type Id: Send + Sync;

    /// Delete the entity.
    async fn delete(client: &RedmineClient, ctx: &RequestContext, id: Self::Id) -> Result<()>;
}
