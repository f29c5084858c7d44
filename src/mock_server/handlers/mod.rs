//! HTTP request handlers for the mock server.

pub mod account;
pub mod issues;
pub mod projects;
pub mod time_entries;
pub mod wiki;

pub use account::*;
pub use issues::*;
pub use projects::*;
pub use time_entries::*;
pub use wiki::*;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::state::SharedState;
use crate::API_KEY_HEADER;

/// Offset/limit parameters accepted by every list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl PageParams {
    /// Slice `items` and wrap them in a list envelope under `key`.
    pub fn envelope<T: Serialize>(&self, key: &str, items: Vec<T>) -> Value {
        let offset = self.offset.unwrap_or(0);
        let limit = self.limit.unwrap_or(25).clamp(1, 100);
        let total = items.len() as u64;
        let page: Vec<T> = items
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();

        let mut body = Map::new();
        body.insert(key.to_string(), json!(page));
        body.insert("total_count".to_string(), json!(total));
        body.insert("offset".to_string(), json!(offset));
        body.insert("limit".to_string(), json!(limit));
        Value::Object(body)
    }
}

/// Path segments arrive with their `.json` suffix.
pub fn strip_json(segment: &str) -> Option<&str> {
    segment.strip_suffix(".json")
}

pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"errors": ["Not found"]}))).into_response()
}

pub fn unprocessable(messages: Vec<String>) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "errors": messages })),
    )
        .into_response()
}

/// `{"<key>": value}` with the given status.
pub fn single<T: Serialize>(status: StatusCode, key: &str, value: &T) -> Response {
    let mut body = Map::new();
    body.insert(key.to_string(), json!(value));
    (status, Json(Value::Object(body))).into_response()
}

/// Reject requests without the configured API key.
pub async fn require_api_key(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let expected = state.read().await.required_api_key.clone();
    if let Some(expected) = expected {
        let provided = request
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());
        if provided != Some(expected.as_str()) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_slices_and_reports_totals() {
        let params = PageParams {
            offset: Some(2),
            limit: Some(2),
        };
        let body = params.envelope("issues", vec![1, 2, 3, 4, 5]);

        assert_eq!(body["issues"], json!([3, 4]));
        assert_eq!(body["total_count"], 5);
        assert_eq!(body["offset"], 2);
        assert_eq!(body["limit"], 2);
    }

    #[test]
    fn test_strip_json() {
        assert_eq!(strip_json("42.json"), Some("42"));
        assert_eq!(strip_json("42"), None);
    }
}
