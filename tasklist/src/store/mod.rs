//! Remote task store abstraction for `TaskList`.
//!
//! Defines the [`TaskStore`] trait the controller persists through.
//! Concrete implementations:
//! - [`http::HttpTaskStore`]: the task server's `/api/tasks` routes
//! - [`memory::MemoryTaskStore`]: in-process store for tests and offline use

pub mod http;
pub mod memory;

use tasklist_proto::task::{Task, TaskId};

/// Errors that can occur while talking to a task store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The request never produced a response (connect, timeout, decode).
    #[error("task store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("task store returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// `error` field of the response body, or the status reason.
        message: String,
    },

    /// The configured base URL cannot be used.
    #[error("invalid task store url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The store is not accepting requests.
    #[error("task store unavailable")]
    Unavailable,

    /// The task does not exist in the store.
    #[error("task {0} not found in store")]
    NotFound(TaskId),
}

/// Async access to the authoritative task collection.
///
/// Every call is a single remote round trip. Implementations do not retry.
pub trait TaskStore: Send + Sync {
    /// Fetch every task owned by `user_id`, in storage order.
    fn list(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Task>, StoreError>> + Send;

    /// Persist a new task.
    fn create(
        &self,
        task: &Task,
    ) -> impl std::future::Future<Output = Result<Task, StoreError>> + Send;

    /// Replace one existing task.
    fn update(
        &self,
        task: &Task,
    ) -> impl std::future::Future<Output = Result<Task, StoreError>> + Send;

    /// Remove a task. Removing an unknown id succeeds.
    fn delete(
        &self,
        id: &TaskId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Bulk replace: stored tasks sharing an id with `tasks` are replaced,
    /// unknown ids are added, everything else is left alone.
    fn replace_all(
        &self,
        tasks: &[Task],
    ) -> impl std::future::Future<Output = Result<Vec<Task>, StoreError>> + Send;
}
