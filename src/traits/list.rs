//! List trait for fetching collections of entities.

use async_trait::async_trait;

use crate::client::RedmineClient;
use crate::context::RequestContext;
use crate::error::Result;
use crate::pagination::{Page, Paginated};

/// Default page size used by [`list_all`] (the service maximum).
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Maximum pages to fetch (safety limit).
const MAX_PAGES: u32 = 1000;

/// List/filter entities.
///
/// Implement this trait for entity types that can be listed with optional
/// filtering, sorting, include expansions and pagination.
///
/// # Example
///
/// ```ignore
/// use redmine_api::{Issue, IssueListQuery, List, PaginationParams, RedmineClient, RequestContext};
///
/// let client = RedmineClient::new("https://redmine.example.com", "key")?;
/// let query = IssueListQuery {
///     project_id: Some(5),
///     pagination: PaginationParams::limit(25),
///     ..Default::default()
/// };
/// let page = Issue::list(&client, &RequestContext::new(), &query).await?;
/// ```
#[async_trait]
pub trait List: Sized + Send {
    /// Query parameters for filtering.
    type Query: Send + Sync;

    /// List entities matching the query (single request).
    ///
    /// # Arguments
    ///
    /// * `client` - The Redmine API client
    /// * `ctx` - Cancellation and deadline for this call
    /// * `query` - Filters, sort, includes and pagination window
    ///
    /// # Errors
    ///
    /// Returns [`RedmineError::InvalidInput`](crate::RedmineError::InvalidInput)
    /// without sending anything when the query fails validation, or any
    /// error from the request.
    async fn list(client: &RedmineClient, ctx: &RequestContext, query: &Self::Query)
        -> Result<Page<Self>>;
}

/// List all entities matching the query, walking pages sequentially.
///
/// The query's pagination window is replaced; every other filter is kept.
///
/// # Errors
///
/// Returns the first error any page request produces.
pub async fn list_all<T>(
    client: &RedmineClient,
    ctx: &RequestContext,
    query: &T::Query,
) -> Result<Vec<T>>
where
    T: List,
    T::Query: Paginated + Clone,
{
    let mut query = query.clone();
    let mut all_items = Vec::new();
    let mut offset: u32 = 0;

    for _ in 0..MAX_PAGES {
        *query.pagination_mut() = crate::PaginationParams::window(offset, DEFAULT_PAGE_SIZE);
        let page = T::list(client, ctx, &query).await?;
        let items_count = page.items.len();
        let has_more = page.has_more;
        all_items.extend(page.items);

        if !has_more || items_count == 0 {
            return Ok(all_items);
        }
        offset += items_count as u32;
    }

    tracing::debug!("reached pagination limit of {} pages, stopping", MAX_PAGES);
    Ok(all_items)
}
