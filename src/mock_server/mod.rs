//! Mock Redmine server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the Redmine
//! REST API for integration and end-to-end testing. Unlike wiremock which
//! mocks at the HTTP level per-test, this server maintains state across
//! requests, so a create followed by a show returns what was stored.
//!
//! Covered endpoints: projects, issues (with journals from notes), time
//! entries, wiki pages (with version history and stale-version conflicts)
//! and `my/account.json`.
//!
//! # Example
//!
//! ```ignore
//! use redmine_api::mock_server::MockServer;
//! use redmine_api::{Issue, RedmineClient, RequestContext, Show, ShowQuery};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = RedmineClient::new(server.url(), "test-key").unwrap();
//!
//!     let issue = Issue::show(&client, &RequestContext::new(), 42, &ShowQuery::default())
//!         .await
//!         .unwrap();
//!     assert_eq!(issue.project.id, 5);
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{DefaultScenario, Fixtures};
pub use server::MockServer;
pub use state::{MockState, SharedState};
