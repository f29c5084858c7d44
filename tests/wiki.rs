//! Wiki page operations against a wiremock Redmine.

use redmine_api::{
    Delete, ErrorKind, List, ProjectRef, RedmineClient, RequestContext, Show, WikiPage,
    WikiPageId, WikiPageListQuery, WikiPageWrite, WikiShowQuery, WikiUpsert,
};
use serde_json::json;
use wiremock::matchers::{any, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> RedmineClient {
    RedmineClient::new(&server.uri(), "test-key").unwrap()
}

#[tokio::test]
async fn test_put_new_page_returns_created() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/projects/docs/wiki/Getting%20Started.json"))
        .and(body_json(json!({
            "wiki_page": {"text": "h1. Getting Started", "comments": "first draft"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "wiki_page": {"title": "Getting_Started", "text": "h1. Getting Started", "version": 1}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let id = WikiPageId::new("docs", "Getting Started");
    let write = WikiPageWrite {
        text: "h1. Getting Started".to_string(),
        comments: Some("first draft".to_string()),
        ..Default::default()
    };
    let outcome = WikiPage::create_or_update(
        &client_for(&mock_server),
        &RequestContext::new(),
        &id,
        &write,
    )
    .await
    .unwrap();

    match outcome {
        WikiUpsert::Created(page) => assert_eq!(page.version, Some(1)),
        WikiUpsert::Updated => panic!("Expected a created page"),
    }
}

#[tokio::test]
async fn test_put_existing_page_returns_updated() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/projects/6/wiki/Home.json"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let id = WikiPageId::new(6u64, "Home");
    let write = WikiPageWrite {
        text: "h1. Welcome back".to_string(),
        version: Some(3),
        ..Default::default()
    };
    let outcome = WikiPage::create_or_update(
        &client_for(&mock_server),
        &RequestContext::new(),
        &id,
        &write,
    )
    .await
    .unwrap();

    assert!(matches!(outcome, WikiUpsert::Updated));
}

#[tokio::test]
async fn test_stale_version_is_conflict_without_retry() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/projects/docs/wiki/Home.json"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "errors": ["Data has been updated by another user."]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let write = WikiPageWrite {
        text: "stale edit".to_string(),
        version: Some(2),
        ..Default::default()
    };
    let err = WikiPage::create_or_update(
        &client_for(&mock_server),
        &RequestContext::new(),
        &WikiPageId::new("docs", "Home"),
        &write,
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.messages(), ["Data has been updated by another user."]);
}

#[tokio::test]
async fn test_show_historical_version() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/docs/wiki/Home/2.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "wiki_page": {"title": "Home", "text": "old text", "version": 2}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let query = WikiShowQuery {
        version: Some(2),
        ..Default::default()
    };
    let page = WikiPage::show(
        &client_for(&mock_server),
        &RequestContext::new(),
        WikiPageId::new("docs", "Home"),
        &query,
    )
    .await
    .unwrap();

    assert_eq!(page.text.as_deref(), Some("old text"));
}

#[tokio::test]
async fn test_index_lists_pages_without_paging() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects/docs/wiki/index.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "wiki_pages": [
                {"title": "Home", "version": 3},
                {"title": "Install", "parent": {"title": "Home"}, "version": 1}
            ]
        })))
        .mount(&mock_server)
        .await;

    let page = WikiPage::list(
        &client_for(&mock_server),
        &RequestContext::new(),
        &WikiPageListQuery::new(ProjectRef::from("docs")),
    )
    .await
    .unwrap();

    assert_eq!(page.len(), 2);
    assert!(!page.has_more);
    assert_eq!(
        page.items[1].parent.as_ref().map(|p| p.title.as_str()),
        Some("Home")
    );
}

#[tokio::test]
async fn test_blank_title_rejected() {
    let mock_server = MockServer::start().await;

    let err = WikiPage::delete(
        &client_for(&mock_server),
        &RequestContext::new(),
        WikiPageId::new("docs", "  "),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}

#[tokio::test]
async fn test_dot_title_never_reaches_another_path() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let query = WikiShowQuery {
        version: Some(3),
        ..Default::default()
    };
    let err = WikiPage::show(
        &client_for(&mock_server),
        &RequestContext::new(),
        WikiPageId::new("docs", ".."),
        &query,
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidInput);
}
