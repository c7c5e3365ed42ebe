//! HTTP routes of the task server.
//!
//! Every handler goes straight to the [`TaskFile`]; the server keeps no
//! task state of its own between requests.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tasklist_proto::api::{
    BulkUpdate, BulkUpdateResponse, ErrorBody, Success, TASKS_PATH, TasksQuery,
};
use tasklist_proto::task::{Task, TaskId};
use tower_http::trace::TraceLayer;

use crate::store::{StoreError, TaskFile};

/// Shared server state.
pub struct AppState {
    /// The data file all routes read and rewrite.
    pub store: TaskFile,
}

impl AppState {
    /// Creates state backed by the data file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: TaskFile::new(path),
        }
    }
}

/// Errors returned by the route handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Requested task does not exist.
    #[error("Task not found")]
    NotFound,

    /// A task with the same id already exists.
    #[error("Task already exists: {0}")]
    Conflict(TaskId),

    /// The request contradicts an invariant of the stored task.
    #[error("{0}")]
    BadRequest(String),

    /// The data file could not be read or written.
    #[error("{context}")]
    Storage {
        /// Message returned to the client.
        context: &'static str,
        /// Underlying store failure (logged, not returned).
        source: StoreError,
    },
}

impl ApiError {
    /// Maps a store error, using `context` as the client-facing message for
    /// I/O and parse failures.
    fn from_store(source: StoreError, context: &'static str) -> Self {
        match source {
            StoreError::NotFound(_) => Self::NotFound,
            StoreError::Duplicate(id) => Self::Conflict(id),
            StoreError::OwnerChanged(id) => {
                Self::BadRequest(format!("userId of task {id} cannot change"))
            }
            StoreError::RepeatedInPayload(id) => {
                Self::BadRequest(format!("task {id} appears more than once"))
            }
            source @ (StoreError::Io { .. } | StoreError::Json(_)) => {
                Self::Storage { context, source }
            }
        }
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Storage { context, source } = &self {
            tracing::error!(error = %source, "{context}");
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Builds the router with all task routes and request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(TASKS_PATH, get(list_tasks).post(create_task).put(bulk_update))
        .route(
            &format!("{TASKS_PATH}/{{id}}"),
            axum::routing::put(update_task).delete(delete_task),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the server with a fresh [`AppState`] over `data_file`.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
    data_file: impl Into<PathBuf>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_state(addr, Arc::new(AppState::new(data_file))).await
}

/// Starts the server with a pre-built [`AppState`].
///
/// Returns the bound address (useful with port `0`) and the serving task.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state(
    addr: &str,
    state: Arc<AppState>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "task server error");
        }
    });

    Ok((bound_addr, handle))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TasksQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state
        .store
        .list(query.user_id.as_deref())
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to read tasks"))?;
    tracing::debug!(user_id = ?query.user_id, count = tasks.len(), "listed tasks");
    Ok(Json(tasks))
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(task): Json<Task>,
) -> Result<Json<Task>, ApiError> {
    let task_id = task.id.clone();
    let created = state
        .store
        .create(task)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to create task"))?;
    tracing::info!(task_id = %task_id, user_id = %created.user_id, "task created");
    Ok(Json(created))
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(task): Json<Task>,
) -> Result<Json<Task>, ApiError> {
    if task.id.as_str() != id {
        return Err(ApiError::BadRequest(format!(
            "task id {} does not match path {id}",
            task.id
        )));
    }
    let updated = state
        .store
        .update(task)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to update task"))?;
    tracing::info!(task_id = %id, "task updated");
    Ok(Json(updated))
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Success>, ApiError> {
    let existed = state
        .store
        .delete(&TaskId::new(id.clone()))
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to delete task"))?;
    tracing::info!(task_id = %id, existed, "task deleted");
    Ok(Json(Success::OK))
}

async fn bulk_update(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BulkUpdate>,
) -> Result<Json<BulkUpdateResponse>, ApiError> {
    let count = body.tasks.len();
    let tasks = state
        .store
        .replace_all(body.tasks)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to update tasks"))?;
    tracing::info!(count, "tasks replaced");
    Ok(Json(BulkUpdateResponse {
        success: true,
        tasks,
    }))
}

/// Starts the server on `127.0.0.1:0` over a fresh temp data file.
#[cfg(test)]
pub async fn start_test_server() -> (
    std::net::SocketAddr,
    tokio::task::JoinHandle<()>,
    tempfile::TempDir,
) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let (addr, handle) = start_server("127.0.0.1:0", dir.path().join("maindata.json"))
        .await
        .expect("failed to start test server");
    (addr, handle, dir)
}
