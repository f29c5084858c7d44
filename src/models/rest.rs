//! Generic request routines shared by the resource implementations.
//!
//! Reads encode their options against the resource table and unwrap the
//! response envelope; writes wrap the payload under the singular key.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::client::{endpoint, RedmineClient};
use crate::context::RequestContext;
use crate::error::Result;
use crate::pagination::Page;
use crate::query;
use crate::resource::{Resource, ResourceSpec};

/// GET a single entity from `path`, returning the unwrapped envelope member.
pub(crate) async fn fetch_one<T, Q>(
    client: &RedmineClient,
    ctx: &RequestContext,
    path: &str,
    options: &Q,
) -> Result<T>
where
    T: Resource + DeserializeOwned,
    Q: Serialize + Sync + ?Sized,
{
    let query = query::encode(T::SPEC, options)?;
    let body: Map<String, Value> = client.get(ctx, path, &query).await?;
    T::SPEC
        .unwrap_one(body)
        .map_err(|e| e.at_endpoint(&endpoint(&Method::GET, path)))
}

/// GET one page of a collection from `path`.
pub(crate) async fn fetch_page<T, Q>(
    client: &RedmineClient,
    ctx: &RequestContext,
    path: &str,
    options: &Q,
) -> Result<Page<T>>
where
    T: Resource + DeserializeOwned,
    Q: Serialize + Sync + ?Sized,
{
    let query = query::encode(T::SPEC, options)?;
    let body: Map<String, Value> = client.get(ctx, path, &query).await?;
    Page::from_body(T::SPEC, body).map_err(|e| e.at_endpoint(&endpoint(&Method::GET, path)))
}

/// POST a wrapped payload to `path` and unwrap the created entity.
pub(crate) async fn create_one<T, B>(
    client: &RedmineClient,
    ctx: &RequestContext,
    path: &str,
    params: &B,
) -> Result<T>
where
    T: Resource + DeserializeOwned,
    B: Serialize + Sync + ?Sized,
{
    let envelope = T::SPEC.wrap(params)?;
    let body: Map<String, Value> = client.post(ctx, path, &envelope).await?;
    T::SPEC
        .unwrap_one(body)
        .map_err(|e| e.at_endpoint(&endpoint(&Method::POST, path)))
}

/// PUT a wrapped payload to `path`.
pub(crate) async fn update_one<B>(
    spec: &ResourceSpec,
    client: &RedmineClient,
    ctx: &RequestContext,
    path: &str,
    params: &B,
) -> Result<()>
where
    B: Serialize + Sync + ?Sized,
{
    let envelope = spec.wrap(params)?;
    client.put(ctx, path, &envelope).await
}
