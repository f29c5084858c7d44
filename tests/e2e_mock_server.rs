//! E2E tests using the mock Redmine server.
//!
//! These tests exercise full workflows against the mock server,
//! testing realistic scenarios rather than individual endpoints.

#![cfg(feature = "test-server")]

use redmine_api::mock_server::{Fixtures, MockServer, MockState};
use redmine_api::{
    get_issues, Create, Delete, ErrorKind, Issue, IssueCreate, IssueListQuery, IssueUpdate,
    Journal, JournalListQuery, List, MyAccount, PaginationParams, Project, ProjectCreate,
    ProjectRef, RedmineClient, RequestContext, Show, ShowQuery, TimeEntry, TimeEntryCreate,
    TimeEntryListQuery, Update, WikiPage, WikiPageId, WikiPageListQuery, WikiPageWrite,
    WikiShowQuery, WikiUpsert,
};

fn client_for(server: &MockServer) -> RedmineClient {
    RedmineClient::new(server.url(), "test-key").unwrap()
}

// =============================================================================
// Server Lifecycle Tests
// =============================================================================

#[tokio::test]
async fn test_server_starts_on_random_port() {
    let server1 = MockServer::start().await;
    let server2 = MockServer::start().await;

    // Both servers should have different URLs
    assert_ne!(server1.url(), server2.url());

    server1.shutdown().await;
    server2.shutdown().await;
}

#[tokio::test]
async fn test_server_shutdown_is_clean() {
    let server = MockServer::start().await;
    let url = server.url().to_string();

    server.shutdown().await;

    // After shutdown, server should not respond
    let client = reqwest::Client::new();
    let result = client.get(format!("{}/health", url)).send().await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_wrong_api_key_is_unauthorized() {
    let state = MockState::new()
        .with_project(Fixtures::project(5, "platform", "Platform"))
        .with_required_api_key("right-key");
    let server = MockServer::with_state(state).await;
    let client = RedmineClient::new(server.url(), "wrong-key").unwrap();

    let err = Project::list(&client, &RequestContext::new(), &Default::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let client = RedmineClient::new(server.url(), "right-key").unwrap();
    let page = Project::list(&client, &RequestContext::new(), &Default::default())
        .await
        .unwrap();
    assert_eq!(page.len(), 1);

    server.shutdown().await;
}

// =============================================================================
// Issue Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_create_then_show_round_trip() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let ctx = RequestContext::new();

    let created = Issue::create(
        &client,
        &ctx,
        &IssueCreate {
            project_id: 5,
            tracker_id: Some(2),
            subject: "Export to CSV".to_string(),
            description: Some("Needed for finance".to_string()),
            ..Default::default()
        },
    )
    .await
    .expect("Failed to create issue");

    let shown = Issue::show(&client, &ctx, created.id, &ShowQuery::default())
        .await
        .expect("Failed to show issue");

    assert_eq!(shown.subject, "Export to CSV");
    assert_eq!(shown.tracker.name, "Feature");
    assert_eq!(shown.author.name, "Redmine Admin");
    assert_eq!(shown.description.as_deref(), Some("Needed for finance"));

    server.shutdown().await;
}

#[tokio::test]
async fn test_create_issue_without_subject_fails_validation() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let err = Issue::create(
        &client,
        &RequestContext::new(),
        &IssueCreate {
            project_id: 5,
            ..Default::default()
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    assert_eq!(err.messages(), ["Subject cannot be blank"]);

    server.shutdown().await;
}

#[tokio::test]
async fn test_update_records_journal() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let ctx = RequestContext::new();

    Issue::update(
        &client,
        &ctx,
        41,
        &IssueUpdate {
            status_id: Some(5),
            assigned_to_id: Some(None),
            notes: Some("Shipped in 2.0".to_string()),
            ..Default::default()
        },
    )
    .await
    .expect("Failed to update issue");

    let issue = Issue::show(&client, &ctx, 41, &ShowQuery::default())
        .await
        .unwrap();
    assert!(issue.is_closed());
    assert!(issue.assigned_to.is_none());
    assert!(issue.journals.is_empty(), "journals need include");

    let journals = Journal::list(&client, &ctx, &JournalListQuery::new(41))
        .await
        .unwrap();
    assert_eq!(journals.len(), 1);
    let journal = &journals.items[0];
    assert_eq!(journal.notes.as_deref(), Some("Shipped in 2.0"));
    assert_eq!(journal.details[0].name, "status_id");

    server.shutdown().await;
}

#[tokio::test]
async fn test_list_filters_and_pages() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let ctx = RequestContext::new();

    let query = IssueListQuery {
        project_id: Some(5),
        pagination: PaginationParams::window(2, 2),
        ..Default::default()
    };
    let page = Issue::list(&client, &ctx, &query).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page.total_count, Some(3));
    assert!(!page.has_more);

    let all = get_issues(
        &client,
        &ctx,
        &IssueListQuery {
            project_id: Some(5),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|issue| issue.project.id == 5));

    server.shutdown().await;
}

#[tokio::test]
async fn test_delete_twice_reports_not_found() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let ctx = RequestContext::new();

    Issue::delete(&client, &ctx, 42).await.expect("first delete");

    let err = Issue::delete(&client, &ctx, 42).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    // Time logged on the issue went with it
    let state = server.state();
    assert!(state.read().await.time_entries.is_empty());

    server.shutdown().await;
}

// =============================================================================
// Project and Time Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_create_project_and_log_time() {
    let server = MockServer::start_empty().await;
    let client = client_for(&server);
    let ctx = RequestContext::new();

    let project = Project::create(
        &client,
        &ctx,
        &ProjectCreate {
            name: "Billing".to_string(),
            identifier: "billing".to_string(),
            ..Default::default()
        },
    )
    .await
    .expect("Failed to create project");

    let mut params = TimeEntryCreate::on_project(project.id, 0.75);
    params.activity_id = Some(8);
    let entry = TimeEntry::create(&client, &ctx, &params).await.unwrap();
    assert_eq!(entry.activity.name, "Design");
    assert!(entry.issue.is_none());

    let page = TimeEntry::list(
        &client,
        &ctx,
        &TimeEntryListQuery {
            project_id: Some("billing".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.len(), 1);

    let err = Project::create(
        &client,
        &ctx,
        &ProjectCreate {
            name: "Billing again".to_string(),
            identifier: "billing".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.messages(), ["Identifier has already been taken"]);

    server.shutdown().await;
}

#[tokio::test]
async fn test_delete_project_by_identifier() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let ctx = RequestContext::new();

    Project::delete(&client, &ctx, ProjectRef::from("platform"))
        .await
        .unwrap();

    let err = Project::show(&client, &ctx, ProjectRef::Id(5), &ShowQuery::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    server.shutdown().await;
}

// =============================================================================
// Wiki Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_wiki_create_update_and_history() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let ctx = RequestContext::new();
    let id = WikiPageId::new("docs", "Install Guide");

    let created = WikiPage::create_or_update(
        &client,
        &ctx,
        &id,
        &WikiPageWrite {
            text: "v1".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(matches!(created, WikiUpsert::Created(ref page) if page.version == Some(1)));

    let updated = WikiPage::create_or_update(
        &client,
        &ctx,
        &id,
        &WikiPageWrite {
            text: "v2".to_string(),
            version: Some(1),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(matches!(updated, WikiUpsert::Updated));

    let first = WikiPage::show(
        &client,
        &ctx,
        id.clone(),
        &WikiShowQuery {
            version: Some(1),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(first.text.as_deref(), Some("v1"));

    let index = WikiPage::list(&client, &ctx, &WikiPageListQuery::new("docs"))
        .await
        .unwrap();
    assert_eq!(index.len(), 2);

    server.shutdown().await;
}

#[tokio::test]
async fn test_wiki_stale_version_conflicts() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let ctx = RequestContext::new();
    let id = WikiPageId::new("docs", "Home");

    WikiPage::create_or_update(
        &client,
        &ctx,
        &id,
        &WikiPageWrite {
            text: "edit A".to_string(),
            version: Some(1),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let err = WikiPage::create_or_update(
        &client,
        &ctx,
        &id,
        &WikiPageWrite {
            text: "edit B".to_string(),
            version: Some(1),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let page = WikiPage::show(&client, &ctx, id, &WikiShowQuery::default())
        .await
        .unwrap();
    assert_eq!(page.text.as_deref(), Some("edit A"));
    assert_eq!(page.version, Some(2));

    server.shutdown().await;
}

// =============================================================================
// Account Tests
// =============================================================================

#[tokio::test]
async fn test_my_account() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let account = MyAccount::show(&client, &RequestContext::new(), (), &())
        .await
        .unwrap();

    assert_eq!(account.login, "admin");
    assert!(account.admin);

    server.shutdown().await;
}
