//! JSON bodies of the `/api/tasks` HTTP routes.

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Base path of the task routes.
pub const TASKS_PATH: &str = "/api/tasks";

/// Query string of `GET /api/tasks`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TasksQuery {
    /// Restrict the listing to one owner; all tasks when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Body of `PUT /api/tasks` (bulk replace).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUpdate {
    pub tasks: Vec<Task>,
}

/// Response of `PUT /api/tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUpdateResponse {
    pub success: bool,
    pub tasks: Vec<Task>,
}

/// Response of `DELETE /api/tasks/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub const OK: Self = Self { success: true };
}

/// Body of every non-success response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
