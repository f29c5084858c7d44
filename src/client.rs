//! Redmine API client.
//!
//! Low-level HTTP transport that handles authentication, JSON encoding and
//! error mapping. Resource operations are implemented via traits on entity
//! types and all funnel through [`RedmineClient::execute`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::Config;
use crate::context::RequestContext;
use crate::error::{RedmineError, Result};

const USER_AGENT: &str = concat!("redmine-api/", env!("CARGO_PKG_VERSION"));

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-Redmine-API-Key";

/// Default HTTP timeout for a single request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Low-level Redmine API client.
///
/// Holds only the base URL, the API key and a connection pool; it keeps no
/// state between calls and can be shared freely across tasks.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use redmine_api::RedmineClient;
///
/// # fn example() -> redmine_api::Result<()> {
/// let client = RedmineClient::new("https://redmine.example.com", "your-api-key")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RedmineClient {
    http: Client,
    base_url: Arc<Url>,
    api_key: Arc<str>,
}

impl std::fmt::Debug for RedmineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedmineClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Failure body returned by Redmine: `{"errors": [...]}` or `{"errors": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    errors: ErrorMessages,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorMessages {
    Many(Vec<String>),
    One(String),
}

impl From<ErrorMessages> for Vec<String> {
    fn from(messages: ErrorMessages) -> Self {
        match messages {
            ErrorMessages::Many(all) => all,
            ErrorMessages::One(single) => vec![single],
        }
    }
}

impl RedmineClient {
    /// Create a new client for `base_url` authenticating with `api_key`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Root of the Redmine instance (e.g., `https://redmine.example.com/`);
    ///   sub-path installs are supported
    /// * `api_key` - API access key from the user's account page
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the API key is empty.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        Self::with_timeout(base_url, api_key, DEFAULT_TIMEOUT)
    }

    /// Create a client from a validated [`Config`].
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_timeout(&config.base_url, &config.api_key, config.timeout)
    }

    /// Create a client with a custom per-request HTTP timeout.
    pub fn with_timeout(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(RedmineError::Config("API key must not be empty".to_string()));
        }

        // Ensure base URL ends with / so relative joins keep any sub-path
        let base_url_str = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        let base_url = Url::parse(&base_url_str)?;
        if base_url.cannot_be_a_base() {
            return Err(RedmineError::Config(format!(
                "'{base_url}' cannot be used as a base URL"
            )));
        }

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(timeout)
            .build()
            .map_err(RedmineError::Http)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            api_key: Arc::from(api_key),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the absolute URL for a resource-relative path and query.
    pub fn url_for(&self, path: &str, query: &str) -> Result<Url> {
        let mut url = self.base_url.join(path.trim_start_matches('/'))?;
        if !query.is_empty() {
            url.set_query(Some(query));
        }
        Ok(url)
    }

    /// Execute one request and decode the JSON response into `T`.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Cancellation and deadline for this call
    /// * `method` - One of GET, POST, PUT, PATCH, DELETE
    /// * `path` - Resource-relative path such as `issues/42.json`
    /// * `query` - Pre-encoded query string, or empty
    /// * `body` - Request payload serialized as JSON, if any
    ///
    /// # Errors
    ///
    /// Maps non-success statuses to typed errors (see [`RedmineError`]);
    /// network failures surface as [`RedmineError::Network`].
    #[tracing::instrument(skip(self, ctx, body))]
    pub async fn execute<B, T>(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        query: &str,
        body: Option<&B>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = endpoint(&method, path);
        let request = self.json_request(method, path, query, body)?;
        let text = self.send_and_read(ctx, &endpoint, request).await?;
        decode(&endpoint, &text)
    }

    /// Execute one request whose success response carries no body (204-style).
    ///
    /// Any body the service does send on success is ignored.
    #[tracing::instrument(skip(self, ctx, body))]
    pub async fn execute_empty<B>(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        query: &str,
        body: Option<&B>,
    ) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let endpoint = endpoint(&method, path);
        let request = self.json_request(method, path, query, body)?;

        ctx.run(&endpoint, async {
            let response = request.send().await.map_err(|source| RedmineError::Network {
                endpoint: endpoint.clone(),
                source,
            })?;
            Self::check_response(&endpoint, response).await?;
            Ok(())
        })
        .await
    }

    /// Execute one request whose success response may or may not carry a
    /// body (201 with an entity, or 204).
    ///
    /// Returns `None` when the body is empty.
    #[tracing::instrument(skip(self, ctx, body))]
    pub async fn execute_optional<B, T>(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        query: &str,
        body: Option<&B>,
    ) -> Result<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = endpoint(&method, path);
        let request = self.json_request(method, path, query, body)?;
        let text = self.send_and_read(ctx, &endpoint, request).await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        decode(&endpoint, &text).map(Some)
    }

    /// Make a GET request.
    pub async fn get<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
        query: &str,
    ) -> Result<T> {
        self.execute(ctx, Method::GET, path, query, None::<&()>).await
    }

    /// Make a POST request with JSON body and decode the response.
    pub async fn post<B, T>(&self, ctx: &RequestContext, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(ctx, Method::POST, path, "", Some(body)).await
    }

    /// Make a POST request with JSON body, expecting no response body.
    pub async fn post_empty<B: Serialize + ?Sized>(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: &B,
    ) -> Result<()> {
        self.execute_empty(ctx, Method::POST, path, "", Some(body)).await
    }

    /// Make a PUT request with JSON body.
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: &B,
    ) -> Result<()> {
        self.execute_empty(ctx, Method::PUT, path, "", Some(body)).await
    }

    /// Make a PATCH request with JSON body.
    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: &B,
    ) -> Result<()> {
        self.execute_empty(ctx, Method::PATCH, path, "", Some(body)).await
    }

    /// Make a DELETE request.
    pub async fn delete(&self, ctx: &RequestContext, path: &str) -> Result<()> {
        self.execute_empty(ctx, Method::DELETE, path, "", None::<&()>)
            .await
    }

    /// Send raw bytes as `application/octet-stream` and decode the JSON reply.
    #[tracing::instrument(skip(self, ctx, bytes), fields(size = bytes.len()))]
    pub async fn post_bytes<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
        query: &str,
        bytes: Vec<u8>,
    ) -> Result<T> {
        let endpoint = endpoint(&Method::POST, path);
        let url = self.url_for(path, query)?;
        let request = self
            .authorized(Method::POST, url)
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            )
            .body(bytes);

        let text = self.send_and_read(ctx, &endpoint, request).await?;
        decode(&endpoint, &text)
    }

    /// Fetch raw bytes from a URL on the same service.
    ///
    /// Relative URLs are resolved against the base URL. Absolute URLs must
    /// share the base URL's scheme, host and port; the API key is never sent
    /// to another origin.
    ///
    /// # Errors
    ///
    /// Returns [`RedmineError::InvalidInput`] for a URL on a foreign origin.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn get_bytes(&self, ctx: &RequestContext, url: &str) -> Result<Vec<u8>> {
        let url = self.base_url.join(url)?;
        if url.origin() != self.base_url.origin() {
            return Err(RedmineError::invalid(format!(
                "refusing to fetch '{url}': it is not on {}",
                self.base_url.origin().ascii_serialization()
            )));
        }
        let endpoint = format!("GET {}", url.path());
        let request = self.authorized(Method::GET, url);

        ctx.run(&endpoint, async {
            let response = request.send().await.map_err(|source| RedmineError::Network {
                endpoint: endpoint.clone(),
                source,
            })?;
            let response = Self::check_response(&endpoint, response).await?;
            let bytes = response.bytes().await.map_err(|source| RedmineError::Network {
                endpoint: endpoint.clone(),
                source,
            })?;
            Ok(bytes.to_vec())
        })
        .await
    }

    fn json_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &str,
        body: Option<&B>,
    ) -> Result<reqwest::RequestBuilder> {
        let url = self.url_for(path, query)?;
        let request = self.authorized(method, url);
        Ok(match body {
            Some(payload) => request.json(payload),
            None => request,
        })
    }

    /// Send `request` under `ctx` and return the body of a successful response.
    async fn send_and_read(
        &self,
        ctx: &RequestContext,
        endpoint: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<String> {
        ctx.run(endpoint, async {
            let response = request.send().await.map_err(|source| RedmineError::Network {
                endpoint: endpoint.to_string(),
                source,
            })?;
            let response = Self::check_response(endpoint, response).await?;
            response.text().await.map_err(|source| RedmineError::Network {
                endpoint: endpoint.to_string(),
                source,
            })
        })
        .await
    }

    fn authorized(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header(API_KEY_HEADER, self.api_key.as_ref())
    }

    /// Check response status and convert errors.
    async fn check_response(endpoint: &str, response: Response) -> Result<Response> {
        let status = response.status();
        tracing::debug!(%endpoint, status = status.as_u16(), "response received");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Self::status_error(endpoint, status, &body))
    }

    /// Map a failed status and its body to the error taxonomy.
    fn status_error(endpoint: &str, status: StatusCode, body: &str) -> RedmineError {
        let envelope = serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .map(|e| Vec::<String>::from(e.errors));
        let endpoint = endpoint.to_string();
        let message = envelope
            .as_ref()
            .map(|messages| messages.join("; "))
            .unwrap_or_default();

        match status {
            StatusCode::UNAUTHORIZED => RedmineError::Unauthorized { endpoint, message },
            StatusCode::FORBIDDEN => RedmineError::Forbidden { endpoint, message },
            StatusCode::NOT_FOUND => RedmineError::NotFound { endpoint },
            StatusCode::CONFLICT => RedmineError::Conflict {
                endpoint,
                messages: envelope.unwrap_or_default(),
            },
            StatusCode::UNPROCESSABLE_ENTITY => RedmineError::ValidationFailed {
                endpoint,
                messages: envelope.unwrap_or_default(),
            },
            s if s.is_server_error() => RedmineError::Server {
                endpoint,
                status: s.as_u16(),
                message,
            },
            s => RedmineError::Api {
                endpoint,
                status: s.as_u16(),
                message,
            },
        }
    }
}

pub(crate) fn endpoint(method: &Method, path: &str) -> String {
    format!("{method} {}", path.trim_start_matches('/'))
}

fn decode<T: DeserializeOwned>(endpoint: &str, text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|source| RedmineError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}
