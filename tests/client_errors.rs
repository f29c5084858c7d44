//! Error mapping, authentication and request context behaviour.

use std::time::Duration;

use redmine_api::{
    ErrorKind, List, MyAccount, RedmineClient, RequestContext, Show, Tracker, API_KEY_HEADER,
};
use serde_json::json;
use wiremock::matchers::{any, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> RedmineClient {
    RedmineClient::new(&server.uri(), "test-key").unwrap()
}

async fn trackers_error(status: u16, body: serde_json::Value) -> redmine_api::RedmineError {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/trackers.json"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&mock_server)
        .await;

    Tracker::list(&client_for(&mock_server), &RequestContext::new(), &())
        .await
        .unwrap_err()
}

#[tokio::test]
async fn test_api_key_header_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/my/account.json"))
        .and(header(API_KEY_HEADER, "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"id": 1, "login": "admin", "firstname": "Redmine", "lastname": "Admin"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let account = MyAccount::show(&client_for(&mock_server), &RequestContext::new(), (), &())
        .await
        .unwrap();

    assert_eq!(account.login, "admin");
}

#[tokio::test]
async fn test_status_codes_map_to_kinds() {
    let cases = [
        (401, ErrorKind::Unauthorized),
        (403, ErrorKind::Forbidden),
        (404, ErrorKind::NotFound),
        (500, ErrorKind::ServiceUnavailable),
        (503, ErrorKind::ServiceUnavailable),
        (400, ErrorKind::Other),
    ];

    for (status, kind) in cases {
        let err = trackers_error(status, json!({})).await;
        assert_eq!(err.kind(), kind, "status {status}");
    }
}

#[tokio::test]
async fn test_forbidden_carries_service_message() {
    let err = trackers_error(403, json!({"errors": ["You are not authorized"]})).await;

    assert_eq!(err.kind(), ErrorKind::Forbidden);
    assert!(err.to_string().contains("You are not authorized"));
    assert!(err.to_string().starts_with("GET trackers.json"));
}

#[tokio::test]
async fn test_only_server_errors_are_retryable() {
    assert!(trackers_error(502, json!({})).await.is_retryable());
    assert!(!trackers_error(422, json!({"errors": ["bad"]})).await.is_retryable());
}

#[tokio::test]
async fn test_undecodable_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/trackers.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let err = Tracker::list(&client_for(&mock_server), &RequestContext::new(), &())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[tokio::test]
async fn test_unreachable_host_is_service_unavailable() {
    // Port 9 (discard) is closed on test machines
    let client = RedmineClient::with_timeout("http://127.0.0.1:9", "test-key", Duration::from_secs(2))
        .unwrap();

    let err = Tracker::list(&client, &RequestContext::new(), &())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
}

// =============================================================================
// Request context
// =============================================================================

#[tokio::test]
async fn test_cancelled_context_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let ctx = RequestContext::new();
    ctx.cancel();

    let err = Tracker::list(&client_for(&mock_server), &ctx, &())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
}

#[tokio::test]
async fn test_cancel_during_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/trackers.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"trackers": []}))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&mock_server)
        .await;

    let ctx = RequestContext::new();
    let token = ctx.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let started = std::time::Instant::now();
    let err = Tracker::list(&client_for(&mock_server), &ctx, &())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_deadline_expires_during_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/trackers.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"trackers": []}))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&mock_server)
        .await;

    let ctx = RequestContext::new().with_timeout(Duration::from_millis(100));
    let err = Tracker::list(&client_for(&mock_server), &ctx, &())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DeadlineExceeded);
    assert!(err.to_string().contains("deadline exceeded"));
}
