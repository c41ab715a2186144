//! API integration tests for the party directory backend.
//!
//! Drives the real router over an in-memory SQLite store, one isolated
//! database per test application.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::{Service, ServiceExt};

use ideasthesia_backend::api;
use ideasthesia_backend::infrastructure::app_state::AppState;
use ideasthesia_backend::infrastructure::auth::JwtService;

/// Helper to create a test application
async fn create_test_app() -> Router {
    // Set test environment
    std::env::set_var("DATABASE_URL", "sqlite::memory:");
    std::env::set_var("JWT_SECRET", "test-secret-key");

    let state = AppState::new().await.expect("Failed to create app state");
    let state = Arc::new(state);

    Router::new()
        .nest("/api", api::routes::create_api_router(state.clone()))
        .with_state(state)
}

/// Mint a bearer token for a test player
fn auth_token(username: &str) -> String {
    let jwt = JwtService::new("test-secret-key".to_string());
    jwt.sign(&format!("user-{username}"), username)
        .expect("Failed to sign test token")
}

async fn send(app: &mut Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = ServiceExt::<Request<Body>>::ready(app)
        .await
        .unwrap()
        .call(request)
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}

/// Helper to make a POST request with JSON body and auth header
async fn post_json_auth(
    app: &mut Router,
    path: &str,
    body: Value,
    token: &str,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Helper to make a bodyless POST request with auth header
async fn post_auth(app: &mut Router, path: &str, token: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Helper to make a GET request with auth header
async fn get_auth(app: &mut Router, path: &str, token: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Helper to make a GET request without any auth header
async fn get_anonymous(app: &mut Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

// ============================================================================
// Auth boundary
// ============================================================================

#[tokio::test]
async fn test_party_endpoints_require_auth() {
    let mut app = create_test_app().await;

    let (status, _) = get_anonymous(&mut app, "/api/party").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("POST")
        .uri("/api/party")
        .header("Content-Type", "application/json")
        .body(Body::from(json!({ "name": "chess" }).to_string()))
        .unwrap();
    let (status, _) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get_auth(&mut app, "/api/party", "not-a-real-token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_needs_no_auth() {
    let mut app = create_test_app().await;
    let (status, body) = get_anonymous(&mut app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// ============================================================================
// Create party
// ============================================================================

#[tokio::test]
async fn test_create_party() {
    let mut app = create_test_app().await;
    let token = auth_token("alice");

    let (status, body) = post_json_auth(&mut app, "/api/party", json!({ "name": "skat" }), &token).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["outcome"], "created");
    assert_eq!(body["party"]["name"], "skat");
    assert_eq!(body["party"]["players"], json!(["alice"]));
    assert_eq!(body["party"]["currentlyPlaying"], "alice");
    assert_eq!(body["party"]["closed"], false);
    assert!(body["message"].as_str().unwrap().contains("Creating a game"));
}

#[tokio::test]
async fn test_create_party_rejects_missing_name() {
    let mut app = create_test_app().await;
    let token = auth_token("alice");

    let (status, body) = post_json_auth(&mut app, "/api/party", json!({ "name": "" }), &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_PARTY_NAME");
}

#[tokio::test]
async fn test_create_party_rejects_long_name() {
    let mut app = create_test_app().await;
    let token = auth_token("alice");

    let (status, body) = post_json_auth(
        &mut app,
        "/api/party",
        json!({ "name": "x".repeat(21) }),
        &token,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "PARTY_NAME_TOO_LONG");
}

#[tokio::test]
async fn test_create_party_conflict_leaves_record_untouched() {
    let mut app = create_test_app().await;
    let alice = auth_token("alice");
    let bob = auth_token("bob");

    let (status, first) = post_json_auth(&mut app, "/api/party", json!({ "name": "uno" }), &alice).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post_json_auth(&mut app, "/api/party", json!({ "name": "uno" }), &bob).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "PARTY_EXISTS");
    assert!(body["error"].as_str().unwrap().contains("already exists"));

    // The stored party still belongs to alice alone.
    let (status, list) = get_auth(&mut app, "/api/party", &bob).await;
    assert_eq!(status, StatusCode::OK);
    let parties = list["parties"].as_array().unwrap();
    let uno = parties.iter().find(|p| p["name"] == "uno").unwrap();
    assert_eq!(uno["players"], json!(["alice"]));
    assert_eq!(
        uno["link"],
        format!("/games/ideasthesia/{}", first["party"]["id"].as_str().unwrap())
    );
}

#[tokio::test]
async fn test_recreate_after_party_closed() {
    let mut app = create_test_app().await;
    let alice = auth_token("alice");
    let bob = auth_token("bob");

    let (status, first) =
        post_json_auth(&mut app, "/api/party", json!({ "name": "phoenix" }), &alice).await;
    assert_eq!(status, StatusCode::CREATED);
    let first_id = first["party"]["id"].as_str().unwrap().to_string();

    // Last player leaving closes the party.
    let (status, leave) = post_auth(&mut app, "/api/party/phoenix/leave", &alice).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(leave["closed"], true);

    // The name is free again; the new record replaces the old one.
    let (status, second) =
        post_json_auth(&mut app, "/api/party", json!({ "name": "phoenix" }), &bob).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(second["outcome"], "recreated");
    assert!(second["message"].as_str().unwrap().contains("Re-creating a game"));
    assert_eq!(second["party"]["players"], json!(["bob"]));
    assert_ne!(second["party"]["id"].as_str().unwrap(), first_id);
}

// ============================================================================
// Join / leave
// ============================================================================

#[tokio::test]
async fn test_join_party_and_list_roster() {
    let mut app = create_test_app().await;
    let alice = auth_token("alice");
    let bob = auth_token("bob");

    let (status, created) = post_json_auth(&mut app, "/api/party", json!({ "name": "go" }), &alice).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, joined) = post_auth(&mut app, "/api/party/go/join", &bob).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(joined["party"]["players"], json!(["alice", "bob"]));
    // The first player keeps the turn.
    assert_eq!(joined["party"]["currentlyPlaying"], "alice");

    let (status, list) = get_auth(&mut app, "/api/party", &alice).await;
    assert_eq!(status, StatusCode::OK);
    let parties = list["parties"].as_array().unwrap();
    let go = parties.iter().find(|p| p["name"] == "go").unwrap();
    assert_eq!(go["players"], json!(["alice", "bob"]));
    assert_eq!(
        go["link"],
        format!("/games/ideasthesia/{}", created["party"]["id"].as_str().unwrap())
    );
}

#[tokio::test]
async fn test_join_unknown_party_is_not_found() {
    let mut app = create_test_app().await;
    let token = auth_token("bob");

    let (status, body) = post_auth(&mut app, "/api/party/nowhere/join", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "PARTY_NOT_FOUND");
}

#[tokio::test]
async fn test_join_closed_party_is_gone() {
    let mut app = create_test_app().await;
    let alice = auth_token("alice");
    let bob = auth_token("bob");

    let (status, _) = post_json_auth(&mut app, "/api/party", json!({ "name": "bridge" }), &alice).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = post_auth(&mut app, "/api/party/bridge/leave", &alice).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_auth(&mut app, "/api/party/bridge/join", &bob).await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["code"], "PARTY_ENDED");
}

#[tokio::test]
async fn test_leave_unknown_party_is_not_found() {
    let mut app = create_test_app().await;
    let token = auth_token("alice");

    let (status, body) = post_auth(&mut app, "/api/party/nowhere/leave", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "PARTY_NOT_FOUND");
}

#[tokio::test]
async fn test_leave_with_remaining_players_keeps_party_open() {
    let mut app = create_test_app().await;
    let alice = auth_token("alice");
    let bob = auth_token("bob");

    let (status, _) = post_json_auth(&mut app, "/api/party", json!({ "name": "tarot" }), &alice).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = post_auth(&mut app, "/api/party/tarot/join", &bob).await;
    assert_eq!(status, StatusCode::OK);

    let (status, left) = post_auth(&mut app, "/api/party/tarot/leave", &bob).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(left["closed"], false);

    let (_, list) = get_auth(&mut app, "/api/party", &alice).await;
    let parties = list["parties"].as_array().unwrap();
    let tarot = parties.iter().find(|p| p["name"] == "tarot").unwrap();
    assert_eq!(tarot["players"], json!(["alice"]));
}
