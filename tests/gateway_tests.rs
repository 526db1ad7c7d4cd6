//! HTTP gateway transport-contract tests against a wiremock backend:
//! bearer attachment, error-body parsing, and the global 401 teardown.

mod common;

use common::*;
use huntdesk::auth::TokenStore;
use huntdesk::config::ApiConfig;
use huntdesk::error::ApiError;
use huntdesk::gateway::{ApiGateway, HttpGateway};
use huntdesk::session::{AuthState, Session};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway_for(server: &MockServer) -> (HttpGateway, Arc<TokenStore>) {
    init_tracing();
    let tokens = Arc::new(TokenStore::new());
    let config = ApiConfig {
        base_url: server.uri(),
        timeout_secs: 5,
    };
    let gateway = HttpGateway::new(&config, Arc::clone(&tokens)).unwrap();
    (gateway, tokens)
}

#[tokio::test]
async fn login_posts_credentials_and_parses_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({
            "email": "user@example.com",
            "password": "hunter22secret"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-1",
            "token_type": "bearer",
            "requires_second_factor": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, _tokens) = gateway_for(&server);
    let grant = gateway
        .login("user@example.com", "hunter22secret", None)
        .await
        .unwrap();
    assert_eq!(grant.access_token, "tok-1");
    assert!(!grant.requires_second_factor);
}

#[tokio::test]
async fn login_rejection_is_an_inline_auth_error_not_a_teardown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Incorrect email or password"
        })))
        .mount(&server)
        .await;

    let (gateway, tokens) = gateway_for(&server);
    let err = gateway
        .login("user@example.com", "wrongpass", None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Auth(ref msg) if msg.contains("Incorrect")));
    // A credentials failure is not a session revocation
    assert_eq!(tokens.revocation_generation(), 0);
}

#[tokio::test]
async fn protected_call_attaches_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/emails/stats"))
        .and(header("authorization", "Bearer tok-9"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::to_value(create_stats(10, 4, 2)).unwrap()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, tokens) = gateway_for(&server);
    tokens.set("tok-9".to_string());

    let stats = gateway.fetch_stats().await.unwrap();
    assert_eq!(stats.total_emails_processed, 10);
}

#[tokio::test]
async fn unauthorized_response_revokes_then_rejects_locally() {
    let server = MockServer::start().await;
    // Exactly one request may arrive; the follow-up must be rejected
    // client-side before any network attempt
    Mock::given(method("GET"))
        .and(path("/api/emails/stats"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Could not validate credentials"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, tokens) = gateway_for(&server);
    tokens.set("expired-tok".to_string());

    let err = gateway.fetch_stats().await.unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired));
    assert!(tokens.get().is_none());
    assert_eq!(tokens.revocation_generation(), 1);

    let err = gateway.fetch_stats().await.unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired));

    // Drop verifies the expect(1) mount: the local rejection sent nothing
    server.verify().await;
}

#[tokio::test]
async fn session_is_forced_down_by_a_401_from_any_component() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-live",
            "token_type": "bearer"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::to_value(create_profile("user@example.com", false)).unwrap()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/emails/stats"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Token expired"
        })))
        .mount(&server)
        .await;

    let tokens = Arc::new(TokenStore::new());
    let config = ApiConfig {
        base_url: server.uri(),
        timeout_secs: 5,
    };
    let gateway = Arc::new(HttpGateway::new(&config, Arc::clone(&tokens)).unwrap());
    let mut session = Session::new(Arc::clone(&gateway), Arc::clone(&tokens));

    session
        .submit_credentials("user@example.com", "hunter22secret")
        .await
        .unwrap();
    assert_eq!(session.state(), AuthState::Authenticated);

    // Some dashboard component fetches stats and hits an expired token
    let err = gateway.fetch_stats().await.unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired));

    // The session observes the teardown without having made the call
    assert_eq!(session.state(), AuthState::Unauthenticated);
    assert!(tokens.get().is_none());
}

#[tokio::test]
async fn scan_sends_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/emails/scan"))
        .and(query_param("max_results", "30"))
        .and(query_param("query", "is:unread category:primary"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(
                serde_json::to_value(create_scan_result(vec![create_candidate(
                    "msg-1", "Rust role",
                )]))
                .unwrap(),
            ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, tokens) = gateway_for(&server);
    tokens.set("tok-1".to_string());

    let scan = gateway
        .scan_mailbox(30, "is:unread category:primary")
        .await
        .unwrap();
    assert_eq!(scan.emails.len(), 1);
    assert_eq!(scan.emails[0].external_id, "msg-1");
}

#[tokio::test]
async fn create_draft_carries_an_idempotency_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/emails/draft"))
        .and(header_exists("x-idempotency-key"))
        .and(body_json(json!({ "processed_email_id": 5 })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::to_value(create_receipt(1)).unwrap()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (gateway, tokens) = gateway_for(&server);
    tokens.set("tok-1".to_string());

    let receipt = gateway.create_draft(5, None, "key-abc").await.unwrap();
    assert_eq!(receipt.draft_id, 1);
}

#[tokio::test]
async fn non_json_error_bodies_fall_back_to_raw_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/emails/stats"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let (gateway, tokens) = gateway_for(&server);
    tokens.set("tok-1".to_string());

    let err = gateway.fetch_stats().await.unwrap_err();
    match err {
        ApiError::OperationFailed { status, message } => {
            assert_eq!(status, 503);
            assert!(message.contains("upstream down"));
        }
        other => panic!("expected OperationFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn invalid_enrollment_code_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/2fa/verify"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Invalid verification code"
        })))
        .mount(&server)
        .await;

    let (gateway, tokens) = gateway_for(&server);
    tokens.set("tok-1".to_string());

    let err = gateway.verify_second_factor_setup("111111").await.unwrap_err();
    assert!(matches!(err, ApiError::Auth(ref msg) if msg.contains("Invalid")));
}
