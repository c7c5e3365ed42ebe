//! Personal task list: ordered view, drag reordering and optimistic
//! persistence.
//!
//! [`TaskListController`] owns one user's list and keeps it in step with a
//! [`TaskStore`](crate::store::TaskStore). Every change is applied to the
//! view first, then persisted; a failed persist restores the view as it
//! was before the change.

pub mod controller;
pub mod order;

pub use controller::TaskListController;

use tasklist_proto::task::{DraftError, TaskId};
use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during task list operations.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The draft is missing a mandatory field.
    #[error(transparent)]
    Invalid(#[from] DraftError),
    /// Task with the given ID is not in the view.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    /// No user's list has been loaded yet.
    #[error("no task list loaded")]
    NotLoaded,
    /// The store rejected or never received the change; the view was
    /// restored.
    #[error(transparent)]
    Store(#[from] StoreError),
}
