//! Integration tests for the ludarena-server admin API

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use ludarena_server::{create_router, ServerConfig, ServerState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app() -> axum::Router {
    let config = ServerConfig::default();
    let state = Arc::new(ServerState::new(&config));
    create_router(&config, state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_status_endpoint() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["engine"], "rust");
    assert_eq!(json["games"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_list_starts_empty() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/tournaments")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["tournaments"], json!([]));
}

#[tokio::test]
async fn test_create_with_bots_and_list() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/tournaments",
            json!({"gameId": "quelhas", "label": "quelhas night", "botCount": 3}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    assert_eq!(created["gameId"], "quelhas");
    assert_eq!(created["label"], "quelhas night");
    assert_eq!(created["phase"], "registration");
    assert_eq!(created["players"].as_object().unwrap().len(), 3);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/tournaments")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let listed = body_json(response).await;
    let entries = listed["tournaments"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["playerCount"], 3);
}

#[tokio::test]
async fn test_create_unknown_game_rejected() {
    let app = test_app();

    let response = app
        .oneshot(post_json("/api/tournaments", json!({"gameId": "backgammon"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("unknown game"));
}

#[tokio::test]
async fn test_start_requires_two_players() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/tournaments",
            json!({"gameId": "nex", "botCount": 1}),
        ))
        .await
        .unwrap();
    let created = body_json(response).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .oneshot(post_json(&format!("/api/tournaments/{id}/start"), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_snapshot_restore_round_trip() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/tournaments",
            json!({"gameId": "produto", "botCount": 4}),
        ))
        .await
        .unwrap();
    let created = body_json(response).await;
    let id = created["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/tournaments/{id}/snapshot"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let snapshot = body_json(response).await;
    assert_eq!(snapshot["players"].as_object().unwrap().len(), 4);

    let response = app
        .clone()
        .oneshot(post_json("/api/tournaments/restore", snapshot.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let restored = body_json(response).await;
    assert_eq!(restored["restored"], *id);

    // The restored tournament snapshots identically
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/tournaments/{id}/snapshot"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let again = body_json(response).await;
    assert_eq!(snapshot, again);
}

#[tokio::test]
async fn test_missing_snapshot_is_bad_request() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/tournaments/tournament-nope/snapshot")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
