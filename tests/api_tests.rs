//! HTTP integration tests for the REST API.
//!
//! Each test builds the full router over a temp-directory database and
//! drives it in-process with `tower::ServiceExt::oneshot`.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use taskdeck::db::Database;
use taskdeck::web::{AppState, build_router};
use tempfile::TempDir;
use tower::ServiceExt;

/// Helper to build an app over a fresh database.
/// The TempDir must stay alive for the duration of the test.
fn test_app() -> (TempDir, Router) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = Database::open(dir.path().join("tasks.db")).expect("Failed to open database");
    let app = build_router(AppState::new(Arc::new(db)));
    (dir, app)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn index_serves_the_page() {
    let (_dir, app) = test_app();

    let response = app.oneshot(empty_request("GET", "/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("Taskdeck"));
    assert!(html.contains("task-form"));
}

#[tokio::test]
async fn index_page_wires_up_the_edit_flow() {
    let (_dir, app) = test_app();

    let response = app.oneshot(empty_request("GET", "/")).await.unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();

    // The page must reach every API operation, including full replacement
    assert!(html.contains("edit-form"));
    assert!(html.contains("openEditModal"));
    assert!(html.contains("method: 'PUT'"));
}

#[tokio::test]
async fn health_reports_version() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(empty_request("GET", "/api/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn list_is_empty_initially() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(empty_request("GET", "/api/tasks"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn create_returns_id_and_message() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/tasks",
            json!({"title": "Buy milk"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["id"], 1);
    assert!(!body["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn create_applies_defaults_visible_in_list() {
    let (_dir, app) = test_app();

    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/tasks",
            json!({"title": "Buy milk"}),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(empty_request("GET", "/api/tasks"))
        .await
        .unwrap();
    let body = body_json(response).await;

    assert_eq!(body.as_array().unwrap().len(), 1);
    let task = &body[0];
    assert_eq!(task["title"], "Buy milk");
    assert_eq!(task["status"], "pending");
    assert_eq!(task["priority"], "medium");
    assert_eq!(task["description"], "");
    assert!(task["completed_at"].is_null());
    assert!(!task["created_at"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn create_without_title_is_a_structured_400() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/tasks",
            json!({"description": "no title here"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "MISSING_REQUIRED_FIELD");
    assert_eq!(body["error"]["field"], "title");
}

#[tokio::test]
async fn create_rejects_unknown_priority() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/tasks",
            json!({"title": "x", "priority": "urgent"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_FIELD_VALUE");
    assert_eq!(body["error"]["field"], "priority");
}

#[tokio::test]
async fn list_rejects_unknown_status_filter() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(empty_request("GET", "/api/tasks?status=everything"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_FIELD_VALUE");
}

#[tokio::test]
async fn list_filters_by_status() {
    let (_dir, app) = test_app();

    for title in ["a", "b"] {
        app.clone()
            .oneshot(json_request("POST", "/api/tasks", json!({"title": title})))
            .await
            .unwrap();
    }
    app.clone()
        .oneshot(empty_request("PATCH", "/api/tasks/1/toggle"))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/tasks?status=completed"))
        .await
        .unwrap();
    let completed = body_json(response).await;
    assert_eq!(completed.as_array().unwrap().len(), 1);
    assert_eq!(completed[0]["title"], "a");

    let response = app
        .oneshot(empty_request("GET", "/api/tasks?status=pending"))
        .await
        .unwrap();
    let pending = body_json(response).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);
    assert_eq!(pending[0]["title"], "b");
}

#[tokio::test]
async fn update_overwrites_and_derives_completed_at() {
    let (_dir, app) = test_app();

    app.clone()
        .oneshot(json_request("POST", "/api/tasks", json!({"title": "draft"})))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/tasks/1",
            json!({"title": "final", "status": "completed", "priority": "high"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(empty_request("GET", "/api/tasks"))
        .await
        .unwrap();
    let body = body_json(response).await;
    let task = &body[0];
    assert_eq!(task["title"], "final");
    assert_eq!(task["status"], "completed");
    assert_eq!(task["priority"], "high");
    assert!(task["completed_at"].is_string());
}

#[tokio::test]
async fn update_requires_title_and_status() {
    let (_dir, app) = test_app();

    app.clone()
        .oneshot(json_request("POST", "/api/tasks", json!({"title": "t"})))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/tasks/1",
            json!({"status": "pending"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(json_request("PUT", "/api/tasks/1", json!({"title": "t"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["field"], "status");
}

#[tokio::test]
async fn update_rejects_unknown_status() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/tasks/1",
            json!({"title": "t", "status": "done"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_FIELD_VALUE");
    assert_eq!(body["error"]["field"], "status");
}

#[tokio::test]
async fn update_missing_id_still_acknowledges() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/tasks/99",
            json!({"title": "ghost", "status": "pending"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn toggle_twice_round_trips_to_pending() {
    let (_dir, app) = test_app();

    app.clone()
        .oneshot(json_request("POST", "/api/tasks", json!({"title": "t"})))
        .await
        .unwrap();

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(empty_request("PATCH", "/api/tasks/1/toggle"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(empty_request("GET", "/api/tasks"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body[0]["status"], "pending");
    assert!(body[0]["completed_at"].is_null());
}

#[tokio::test]
async fn toggle_missing_id_still_acknowledges() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(empty_request("PATCH", "/api/tasks/42/toggle"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn delete_removes_task_and_acknowledges_missing_ids() {
    let (_dir, app) = test_app();

    app.clone()
        .oneshot(json_request("POST", "/api/tasks", json!({"title": "t"})))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/api/tasks/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/api/tasks"))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!([]));

    // Deleting again is still a success
    let response = app
        .oneshot(empty_request("DELETE", "/api/tasks/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn ids_stay_unique_across_deletes() {
    let (_dir, app) = test_app();

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/tasks", json!({"title": "a"})))
        .await
        .unwrap();
    let first = body_json(response).await["id"].as_i64().unwrap();

    app.clone()
        .oneshot(empty_request("DELETE", &format!("/api/tasks/{first}")))
        .await
        .unwrap();

    let response = app
        .oneshot(json_request("POST", "/api/tasks", json!({"title": "b"})))
        .await
        .unwrap();
    let second = body_json(response).await["id"].as_i64().unwrap();

    assert!(second > first);
}
