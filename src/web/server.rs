//! HTTP server implementation.
//!
//! This module provides the axum-based HTTP server that serves the task
//! list page and exposes the REST API endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    routing::{get, patch, put},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::templates;
use crate::db::Database;
use crate::error::{ApiError, ApiResult};
use crate::types::{Priority, Status, StatusFilter, Task};

/// Server state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Reference to the task database.
    db: Arc<Database>,
}

impl AppState {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Acknowledgment body for mutations without a payload.
#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

/// Response for task creation: the assigned id plus an acknowledgment.
#[derive(Serialize)]
struct CreateTaskResponse {
    id: i64,
    message: &'static str,
}

#[derive(Deserialize)]
struct ListParams {
    status: Option<String>,
}

#[derive(Deserialize)]
struct CreateTaskRequest {
    title: Option<String>,
    description: Option<String>,
    priority: Option<String>,
}

#[derive(Deserialize)]
struct UpdateTaskRequest {
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
}

/// Root endpoint - serves the task list page.
async fn index() -> Html<&'static str> {
    Html(templates::INDEX_TEMPLATE)
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Require a non-empty string field, surfacing a structured 400 otherwise.
fn require_field(value: Option<String>, field: &str) -> ApiResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::missing_field(field)),
    }
}

/// Parse an optional enum field, rejecting unrecognized values.
fn parse_field<T>(value: Option<String>, field: &str) -> ApiResult<Option<T>>
where
    T: std::str::FromStr,
{
    match value {
        None => Ok(None),
        Some(v) => v.parse().map(Some).map_err(|_| {
            ApiError::invalid_value(field, format!("unrecognized {}: {}", field, v))
        }),
    }
}

/// GET /api/tasks - list tasks, optionally filtered by status.
async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Task>>> {
    let filter = parse_field::<StatusFilter>(params.status, "status")?
        .unwrap_or(StatusFilter::All);

    let tasks = state.db().list_tasks(filter)?;
    Ok(Json(tasks))
}

/// POST /api/tasks - create a new pending task.
async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<CreateTaskResponse>)> {
    let title = require_field(req.title, "title")?;
    let priority = parse_field::<Priority>(req.priority, "priority")?.unwrap_or_default();
    let description = req.description.unwrap_or_default();

    let id = state.db().create_task(&title, &description, priority)?;
    info!(id, "task created");

    Ok((
        StatusCode::CREATED,
        Json(CreateTaskResponse {
            id,
            message: "task created",
        }),
    ))
}

/// PUT /api/tasks/{id} - full replacement of a task's mutable fields.
///
/// A missing id updates zero rows and still acknowledges success; see the
/// not-found note in DESIGN.md.
async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let title = require_field(req.title, "title")?;
    let status: Status = parse_field(req.status, "status")?
        .ok_or_else(|| ApiError::missing_field("status"))?;
    let priority = parse_field::<Priority>(req.priority, "priority")?.unwrap_or_default();
    let description = req.description.unwrap_or_default();

    state
        .db()
        .update_task(task_id, &title, &description, status, priority)?;

    Ok(Json(MessageResponse {
        message: "task updated",
    }))
}

/// DELETE /api/tasks/{id} - remove a task.
async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.db().delete_task(task_id)?;

    Ok(Json(MessageResponse {
        message: "task deleted",
    }))
}

/// PATCH /api/tasks/{id}/toggle - flip a task between pending and completed.
async fn toggle_task(
    State(state): State<AppState>,
    Path(task_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.db().toggle_task(task_id)?;

    Ok(Json(MessageResponse {
        message: "task toggled",
    }))
}

/// Build the router with all routes.
pub fn build_router(state: AppState) -> Router {
    // Permissive CORS for local development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{task_id}",
            put(update_task).delete(delete_task),
        )
        .route("/api/tasks/{task_id}/toggle", patch(toggle_task))
        .route("/api/health", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server and run it until ctrl-c.
pub async fn start_server(db: Arc<Database>, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(db);
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("taskdeck listening on http://{}", bound_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    Ok(())
}
