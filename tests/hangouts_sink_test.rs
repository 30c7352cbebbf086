use gitgatgotya::config::HangoutsConfig;
use gitgatgotya::core::{MessagingSink, NotificationMessage};
use gitgatgotya::{AppError, HangoutsSink, TokenCache};
use httpmock::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

fn sink(server: &MockServer, dir: &TempDir) -> HangoutsSink {
    let config = HangoutsConfig {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        endpoint: server.base_url(),
    };
    let cache = TokenCache::open(dir.path().join("hangouts_cached_token")).unwrap();
    HangoutsSink::new(reqwest::Client::new(), config, cache)
}

#[tokio::test]
async fn test_first_login_caches_refresh_token() {
    let server = MockServer::start_async().await;
    let dir = TempDir::new().unwrap();

    let login = server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token").json_body(json!({
                "client_id": "client-id",
                "client_secret": "client-secret",
                "grant_type": "client_credentials"
            }));
            then.status(200)
                .json_body(json!({"access_token": "access-1", "refresh_token": "refresh-1"}));
        })
        .await;

    let mut sink = sink(&server, &dir);
    assert_ok!(sink.connect().await);

    login.assert_async().await;
    assert!(sink.is_connected());
    let cached = std::fs::read_to_string(dir.path().join("hangouts_cached_token")).unwrap();
    assert_eq!(cached, "refresh-1");
}

#[tokio::test]
async fn test_cached_token_uses_refresh_grant() {
    let server = MockServer::start_async().await;
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("hangouts_cached_token"), "refresh-old").unwrap();

    let login = server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token").json_body(json!({
                "client_id": "client-id",
                "client_secret": "client-secret",
                "grant_type": "refresh_token",
                "refresh_token": "refresh-old"
            }));
            then.status(200).json_body(json!({"access_token": "access-2"}));
        })
        .await;

    let mut sink = sink(&server, &dir);
    assert_ok!(sink.connect().await);

    login.assert_async().await;
    let cached = std::fs::read_to_string(dir.path().join("hangouts_cached_token")).unwrap();
    assert_eq!(cached, "refresh-old");
}

#[tokio::test]
async fn test_rejected_login_is_connect_error() {
    let server = MockServer::start_async().await;
    let dir = TempDir::new().unwrap();

    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(401);
        })
        .await;

    let mut sink = sink(&server, &dir);
    let err = assert_err!(sink.connect().await);
    assert!(matches!(err, AppError::SinkConnect { .. }));
    assert!(!sink.is_connected());
}

#[tokio::test]
async fn test_broadcast_sends_to_every_contact() {
    let server = MockServer::start_async().await;
    let dir = TempDir::new().unwrap();

    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200)
                .json_body(json!({"access_token": "access-1", "refresh_token": "refresh-1"}));
        })
        .await;
    let roster = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/roster")
                .header("authorization", "Bearer access-1");
            then.status(200).json_body(json!({
                "contacts": [{"id": "c1", "name": "Wyn"}, {"id": "c2"}]
            }));
        })
        .await;
    let to_c1 = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/conversations/c1/messages")
                .json_body(json!({"text": "Hope you are enjoying Hades"}));
            then.status(200);
        })
        .await;
    let to_c2 = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/conversations/c2/messages")
                .json_body(json!({"text": "Hope you are enjoying Hades"}));
            then.status(200);
        })
        .await;
    let close = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/session/close")
                .header("authorization", "Bearer access-1");
            then.status(204);
        })
        .await;

    let mut sink = sink(&server, &dir);
    assert_ok!(sink.connect().await);
    assert_eq!(assert_ok!(sink.roster_size().await), 2);

    let delivered = assert_ok!(
        sink.broadcast(&NotificationMessage::for_game("Hades"))
            .await
    );
    assert_ok!(sink.disconnect().await);

    assert_eq!(delivered, 2);
    roster.assert_async().await;
    to_c1.assert_async().await;
    to_c2.assert_async().await;
    close.assert_async().await;
    assert!(!sink.is_connected());
}

#[tokio::test]
async fn test_partial_delivery_counts_successes() {
    let server = MockServer::start_async().await;
    let dir = TempDir::new().unwrap();

    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200).json_body(json!({"access_token": "access-1"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/roster");
            then.status(200)
                .json_body(json!({"contacts": [{"id": "ok"}, {"id": "gone"}]}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/conversations/ok/messages");
            then.status(200);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/conversations/gone/messages");
            then.status(404);
        })
        .await;

    let mut sink = sink(&server, &dir);
    assert_ok!(sink.connect().await);
    let delivered = assert_ok!(
        sink.broadcast(&NotificationMessage::for_game("Hades"))
            .await
    );
    assert_eq!(delivered, 1);
}

#[tokio::test]
async fn test_broadcast_before_connect_fails() {
    let server = MockServer::start_async().await;
    let dir = TempDir::new().unwrap();

    let mut sink = sink(&server, &dir);
    let err = assert_err!(
        sink.broadcast(&NotificationMessage::for_game("Hades"))
            .await
    );
    assert!(matches!(err, AppError::SinkDelivery { .. }));
    assert_ok!(sink.disconnect().await);
}

#[tokio::test]
async fn test_contact_id_is_escaped_as_one_path_segment() {
    let server = MockServer::start_async().await;
    let dir = TempDir::new().unwrap();

    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200).json_body(json!({"access_token": "access-1"}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/roster");
            then.status(200)
                .json_body(json!({"contacts": [{"id": "team/ops room"}]}));
        })
        .await;
    let escaped = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/conversations/team%2Fops%20room/messages");
            then.status(200);
        })
        .await;
    let unescaped = server
        .mock_async(|when, then| {
            when.method(POST).path_contains("/conversations/team/");
            then.status(200);
        })
        .await;

    let mut sink = sink(&server, &dir);
    assert_ok!(sink.connect().await);
    let delivered = assert_ok!(
        sink.broadcast(&NotificationMessage::for_game("Hades"))
            .await
    );

    assert_eq!(delivered, 1);
    escaped.assert_async().await;
    unescaped.assert_hits_async(0).await;
}
