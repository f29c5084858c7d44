//! Create trait for adding entities.

use async_trait::async_trait;

use crate::client::RedmineClient;
use crate::context::RequestContext;
use crate::error::Result;

/// Create a new entity.
///
/// Required fields are the caller's responsibility; the service's own
/// validation failures come back as
/// [`RedmineError::ValidationFailed`](crate::RedmineError::ValidationFailed)
/// with every message preserved.
#[async_trait]
pub trait Create: Sized {
    /// Payload for the create request.
    type Params: Send + Sync;

    /// Create the entity and return it as stored by the service.
    async fn create(
        client: &RedmineClient,
        ctx: &RequestContext,
        params: &Self::Params,
    ) -> Result<Self>;
}
