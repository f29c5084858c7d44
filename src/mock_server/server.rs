//! Mock Redmine server.
//!
//! Provides an axum-based HTTP server that simulates the Redmine REST API.

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::fixtures::{DefaultScenario, Fixtures};
use super::handlers;
use super::state::{MockState, SharedState};

/// A mock Redmine server for testing.
///
/// The server runs in the background and can be used to test the Redmine
/// client against a stateful API implementation.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: SharedState,
}

impl MockServer {
    /// Start a new mock server with default fixtures.
    ///
    /// The server listens on a random available port and returns immediately.
    /// Use `url()` to get the server's base URL.
    pub async fn start() -> Self {
        Self::with_state(Self::default_state()).await
    }

    /// Start a mock server with empty state.
    ///
    /// Useful when you want to control exactly what data is available.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    pub async fn with_state(state: MockState) -> Self {
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            url: format!("http://{}", addr),
            handle,
            state: shared_state,
        }
    }

    /// Get the base URL of the mock server.
    ///
    /// Use this URL when creating a `RedmineClient` for testing.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get access to the server's shared state.
    ///
    /// This allows modifying the mock data during a test.
    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    /// Shutdown the server.
    ///
    /// This aborts the server task. It's safe to call multiple times.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Create the default state with common test fixtures.
    fn default_state() -> MockState {
        Self::state_from_scenario(Fixtures::default_scenario())
    }

    /// Create state from a scenario.
    fn state_from_scenario(scenario: DefaultScenario) -> MockState {
        let mut state = MockState::new().with_account(scenario.account);

        for project in scenario.projects {
            state = state.with_project(project);
        }
        for issue in scenario.issues {
            state = state.with_issue(issue);
        }
        for entry in scenario.time_entries {
            state = state.with_time_entry(entry);
        }
        for (project_id, page) in scenario.wiki_pages {
            state = state.with_wiki_page(project_id, page);
        }

        state
    }

    /// Create the axum router with all routes.
    ///
    /// Every segment ending in `.json` is captured whole and stripped by the
    /// handler, since the router cannot match a parameter followed by a
    /// literal suffix.
    pub(crate) fn create_router(state: SharedState) -> Router {
        Router::new()
            // Project routes
            .route(
                "/projects.json",
                get(handlers::list_projects).post(handlers::create_project),
            )
            .route(
                "/projects/:project",
                get(handlers::get_project)
                    .put(handlers::update_project)
                    .delete(handlers::delete_project),
            )
            // Wiki routes
            .route(
                "/projects/:project/wiki/:title",
                get(handlers::get_wiki_page)
                    .put(handlers::put_wiki_page)
                    .delete(handlers::delete_wiki_page),
            )
            .route(
                "/projects/:project/wiki/:title/:version",
                get(handlers::get_wiki_page_version),
            )
            // Issue routes
            .route(
                "/issues.json",
                get(handlers::list_issues).post(handlers::create_issue),
            )
            .route(
                "/issues/:id",
                get(handlers::get_issue)
                    .put(handlers::update_issue)
                    .delete(handlers::delete_issue),
            )
            // Time entry routes
            .route(
                "/time_entries.json",
                get(handlers::list_time_entries).post(handlers::create_time_entry),
            )
            .route(
                "/time_entries/:id",
                get(handlers::get_time_entry)
                    .put(handlers::update_time_entry)
                    .delete(handlers::delete_time_entry),
            )
            // Account routes
            .route(
                "/my/account.json",
                get(handlers::get_account).put(handlers::update_account),
            )
            .layer(middleware::from_fn_with_state(
                state.clone(),
                handlers::require_api_key,
            ))
            // Health check stays open
            .route("/health", get(health_check))
            .with_state(state)
    }
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Create, Delete, ErrorKind, Issue, IssueCreate, IssueListQuery, List, PaginationParams,
        Project, ProjectRef, RedmineClient, RequestContext, Show, ShowQuery,
    };
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_server_starts_and_responds() {
        let server = MockServer::start().await;

        // Server should be accessible
        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/health", server.url()))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());
        assert_eq!(response.text().await.unwrap(), "ok");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_router_rejects_wrong_api_key() {
        let state = MockServer::default_state()
            .with_required_api_key("secret")
            .shared();
        let app = MockServer::create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/issues.json")
                    .header(crate::API_KEY_HEADER, "wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_router_resolves_project_identifier() {
        let app = MockServer::create_router(MockServer::default_state().shared());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/projects/platform.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_show_project_with_redmine_client() {
        let server = MockServer::start().await;
        let client = RedmineClient::new(server.url(), "test-key").unwrap();
        let ctx = RequestContext::new();

        let project = Project::show(
            &client,
            &ctx,
            ProjectRef::from("platform"),
            &ShowQuery::default(),
        )
        .await
        .expect("Failed to show project");

        assert_eq!(project.id, 5);
        assert_eq!(project.name, "Platform");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_list_issues_with_redmine_client() {
        let server = MockServer::start().await;
        let client = RedmineClient::new(server.url(), "test-key").unwrap();
        let ctx = RequestContext::new();

        let query = IssueListQuery {
            project_id: Some(5),
            pagination: PaginationParams::limit(2),
            ..Default::default()
        };
        let page = Issue::list(&client, &ctx, &query)
            .await
            .expect("Failed to list issues");

        assert_eq!(page.len(), 2);
        assert_eq!(page.total_count, Some(3));
        assert!(page.items.iter().all(|i| i.project.id == 5));

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_create_then_delete_issue() {
        let server = MockServer::start().await;
        let client = RedmineClient::new(server.url(), "test-key").unwrap();
        let ctx = RequestContext::new();

        let created = Issue::create(
            &client,
            &ctx,
            &IssueCreate {
                project_id: 6,
                subject: "Spelling in intro".to_string(),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to create issue");
        assert_eq!(created.project.id, 6);

        Issue::delete(&client, &ctx, created.id)
            .await
            .expect("Failed to delete issue");

        let err = Issue::delete(&client, &ctx, created.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        server.shutdown().await;
    }
}
