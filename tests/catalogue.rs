//! Trackers, news, relations, attachments, users and time entry edits
//! against wiremock.

use redmine_api::{
    Attachment, AttachmentUpdate, Create, Delete, ErrorKind, IssueRelation, List, News,
    RedmineClient, RelationListQuery, RelationType, RequestContext, Show, ShowQuery, TimeEntry,
    TimeEntryUpdate, Tracker, Update, User, UserCreate,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> RedmineClient {
    RedmineClient::new(&server.uri(), "test-key").unwrap()
}

#[tokio::test]
async fn test_trackers_arrive_in_one_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/trackers.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "trackers": [
                {"id": 1, "name": "Bug", "default_status": {"id": 1, "name": "New"}},
                {"id": 2, "name": "Feature"},
                {"id": 3, "name": "Support"}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let page = Tracker::list(&client_for(&mock_server), &RequestContext::new(), &())
        .await
        .unwrap();

    assert_eq!(page.len(), 3);
    assert_eq!(page.items[0].default_status.as_ref().unwrap().name, "New");
}

#[tokio::test]
async fn test_show_news_with_comments() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news/7.json"))
        .and(query_param("include", "comments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "news": {
                "id": 7,
                "project": {"id": 5, "name": "Platform"},
                "author": {"id": 1, "name": "Redmine Admin"},
                "title": "Release 2.0",
                "comments": [
                    {"id": 1, "author": {"id": 3, "name": "John Smith"}, "content": "Nice"}
                ]
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let news = News::show(
        &client_for(&mock_server),
        &RequestContext::new(),
        7,
        &ShowQuery::include("comments"),
    )
    .await
    .unwrap();

    assert_eq!(news.title, "Release 2.0");
    assert_eq!(news.comments[0].content.as_deref(), Some("Nice"));
}

// =============================================================================
// Relations
// =============================================================================

#[tokio::test]
async fn test_relations_listed_per_issue() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/issues/42/relations.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "relations": [
                {"id": 3, "issue_id": 42, "issue_to_id": 43, "relation_type": "blocks"},
                {"id": 4, "issue_id": 40, "issue_to_id": 42, "relation_type": "copied_to"}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let page = IssueRelation::list(
        &client_for(&mock_server),
        &RequestContext::new(),
        &RelationListQuery::new(42),
    )
    .await
    .unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page.items[1].relation_type, RelationType::CopiedTo);
}

#[tokio::test]
async fn test_unknown_relation_type_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/relations/3.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "relation": {"id": 3, "issue_id": 42, "issue_to_id": 43, "relation_type": "mentions"}
        })))
        .mount(&mock_server)
        .await;

    let err = IssueRelation::show(&client_for(&mock_server), &RequestContext::new(), 3, &())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(err.to_string().starts_with("GET relations/3.json:"));
}

#[tokio::test]
async fn test_bad_list_item_names_the_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/trackers.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "trackers": [{"id": 1, "name": "Bug"}, {"id": "two", "name": "Feature"}]
        })))
        .mount(&mock_server)
        .await;

    let err = Tracker::list(&client_for(&mock_server), &RequestContext::new(), &())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(err.to_string().starts_with("GET trackers.json:"));
}

#[tokio::test]
async fn test_delete_relation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/relations/3.json"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    IssueRelation::delete(&client_for(&mock_server), &RequestContext::new(), 3)
        .await
        .unwrap();
}

// =============================================================================
// Attachments
// =============================================================================

#[tokio::test]
async fn test_attachment_show_update_delete() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);
    let ctx = RequestContext::new();

    Mock::given(method("GET"))
        .and(path("/attachments/9.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "attachment": {
                "id": 9,
                "filename": "trace.log",
                "filesize": 2048,
                "content_type": "text/plain"
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/attachments/9.json"))
        .and(body_json(json!({"attachment": {"description": "Crash trace"}})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/attachments/9.json"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let attachment = Attachment::show(&client, &ctx, 9, &()).await.unwrap();
    assert_eq!(attachment.filesize, 2048);

    let update = AttachmentUpdate {
        description: Some("Crash trace".to_string()),
        ..Default::default()
    };
    Attachment::update(&client, &ctx, 9, &update).await.unwrap();
    Attachment::delete(&client, &ctx, 9).await.unwrap();
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_create_user_wraps_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users.json"))
        .and(body_partial_json(json!({
            "user": {"login": "jsmith", "firstname": "John", "lastname": "Smith"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "user": {"id": 3, "login": "jsmith", "firstname": "John", "lastname": "Smith"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let params = UserCreate {
        login: "jsmith".to_string(),
        firstname: "John".to_string(),
        lastname: "Smith".to_string(),
        mail: "jsmith@example.net".to_string(),
        generate_password: Some(true),
        ..Default::default()
    };
    let user = User::create(&client_for(&mock_server), &RequestContext::new(), &params)
        .await
        .unwrap();

    assert_eq!(user.id, 3);
    assert_eq!(user.full_name(), "John Smith");
}

#[tokio::test]
async fn test_deleted_user_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/99.json"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = User::show(
        &client_for(&mock_server),
        &RequestContext::new(),
        99,
        &ShowQuery::default(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// =============================================================================
// Time entry edits
// =============================================================================

#[tokio::test]
async fn test_update_then_delete_time_entry() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);
    let ctx = RequestContext::new();

    Mock::given(method("PUT"))
        .and(path("/time_entries/11.json"))
        .and(body_json(json!({"time_entry": {"hours": 3.0, "comments": "Review"}})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/time_entries/11.json"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let update = TimeEntryUpdate {
        hours: Some(3.0),
        comments: Some("Review".to_string()),
        ..Default::default()
    };
    TimeEntry::update(&client, &ctx, 11, &update).await.unwrap();
    TimeEntry::delete(&client, &ctx, 11).await.unwrap();
}
