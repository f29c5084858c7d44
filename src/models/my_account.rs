//! The authenticated user's own account (`my/account.json`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::RedmineClient;
use crate::context::RequestContext;
use crate::error::Result;
use crate::models::common::{CustomField, CustomFieldValue};
use crate::models::rest;
use crate::resource::{self, Resource, ResourceSpec};
use crate::traits::{Show, Update};

const MY_ACCOUNT_PATH: &str = "my/account.json";

/// Account details of the user owning the API key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MyAccount {
    pub id: u64,
    pub login: String,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_login_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub custom_fields: Vec<CustomFieldValue>,
}

impl Resource for MyAccount {
    const SPEC: &'static ResourceSpec = &resource::MY_ACCOUNT;
}

/// Fields a user may change on their own account.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct MyAccountUpdate {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub mail: Option<String>,
    pub custom_fields: Option<Vec<CustomField>>,
}

#[async_trait]
impl Show for MyAccount {
    type Id = ();
    type Query = ();

    #[tracing::instrument(skip(client, ctx))]
    async fn show(client: &RedmineClient, ctx: &RequestContext, _id: (), query: &()) -> Result<Self> {
        rest::fetch_one(client, ctx, MY_ACCOUNT_PATH, query).await
    }
}

#[async_trait]
impl Update for MyAccount {
    type Id = ();
    type Params = MyAccountUpdate;

    #[tracing::instrument(skip(client, ctx, params))]
    async fn update(
        client: &RedmineClient,
        ctx: &RequestContext,
        _id: (),
        params: &MyAccountUpdate,
    ) -> Result<()> {
        rest::update_one(Self::SPEC, client, ctx, MY_ACCOUNT_PATH, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_my_account_update_rejects_admin_flag() {
        let payload = json!({"admin": true});
        assert!(MyAccount::SPEC.wrap(&payload).is_err());

        let params = MyAccountUpdate {
            mail: Some("me@example.com".into()),
            ..Default::default()
        };
        let wrapped = serde_json::to_value(MyAccount::SPEC.wrap(&params).unwrap()).unwrap();
        assert_eq!(wrapped, json!({"user": {"mail": "me@example.com"}}));
    }
}
