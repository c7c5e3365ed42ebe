//! JSON data file holding every task.
//!
//! The [`TaskFile`] reads the whole file, applies one change and rewrites the
//! whole file on each mutating call. Calls within one process are serialized
//! through an [`RwLock`]; separate processes sharing the file are not
//! coordinated and can overwrite each other.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tasklist_proto::task::{Task, TaskId};
use tokio::sync::RwLock;

/// Collections written by [`TaskFile::reset`] besides `tasks`.
const EMPTY_COLLECTIONS: &[&str] = &[
    "classes",
    "assignments",
    "announcements",
    "newsletters",
    "notices",
    "submissions",
    "messages",
];

/// Errors raised by the data file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the data file failed.
    #[error("data file {path}: {source}")]
    Io {
        /// File that was accessed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The data file is not valid JSON of the expected shape.
    #[error("malformed data file: {0}")]
    Json(#[from] serde_json::Error),

    /// A task with this id already exists.
    #[error("task already exists: {0}")]
    Duplicate(TaskId),

    /// No task with this id exists.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// A bulk payload lists the same id more than once.
    #[error("task {0} appears more than once in the payload")]
    RepeatedInPayload(TaskId),

    /// An update tried to move a task to another owner.
    #[error("task {0} belongs to another user")]
    OwnerChanged(TaskId),
}

/// On-disk layout: the `tasks` array plus every other portal collection,
/// carried through untouched.
#[derive(Debug, Default, Serialize, Deserialize)]
struct DataFile {
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(flatten)]
    other: serde_json::Map<String, serde_json::Value>,
}

/// File-backed task store.
pub struct TaskFile {
    path: PathBuf,
    lock: RwLock<()>,
}

impl TaskFile {
    /// Creates a store over `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    /// Path of the underlying data file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the tasks of one user, or all tasks when `user_id` is `None`,
    /// in file order.
    pub async fn list(&self, user_id: Option<&str>) -> Result<Vec<Task>, StoreError> {
        let _guard = self.lock.read().await;
        let data = self.read().await?;
        Ok(match user_id {
            Some(user) => data.tasks.into_iter().filter(|t| t.user_id == user).collect(),
            None => data.tasks,
        })
    }

    /// Appends a new task.
    pub async fn create(&self, task: Task) -> Result<Task, StoreError> {
        self.modify(|data| {
            if data.tasks.iter().any(|t| t.id == task.id) {
                return Err(StoreError::Duplicate(task.id.clone()));
            }
            data.tasks.push(task.clone());
            Ok(task)
        })
        .await
    }

    /// Replaces the task with the same id.
    pub async fn update(&self, task: Task) -> Result<Task, StoreError> {
        self.modify(|data| {
            let existing = data
                .tasks
                .iter_mut()
                .find(|t| t.id == task.id)
                .ok_or_else(|| StoreError::NotFound(task.id.clone()))?;
            if existing.user_id != task.user_id {
                return Err(StoreError::OwnerChanged(task.id.clone()));
            }
            *existing = task.clone();
            Ok(task)
        })
        .await
    }

    /// Removes a task, returning whether it existed.
    pub async fn delete(&self, id: &TaskId) -> Result<bool, StoreError> {
        self.modify(|data| {
            let before = data.tasks.len();
            data.tasks.retain(|t| t.id != *id);
            Ok(data.tasks.len() != before)
        })
        .await
    }

    /// Bulk replace: stored tasks whose id is in `tasks` are dropped and the
    /// payload is appended after the remaining ones. Unknown ids are simply
    /// added.
    ///
    /// The whole payload is rejected, and nothing is written, if it repeats
    /// an id or hands an existing task to another owner.
    pub async fn replace_all(&self, tasks: Vec<Task>) -> Result<Vec<Task>, StoreError> {
        self.modify(|data| {
            check_bulk(&data.tasks, &tasks)?;
            data.tasks
                .retain(|stored| !tasks.iter().any(|t| t.id == stored.id));
            data.tasks.extend(tasks.iter().cloned());
            Ok(tasks)
        })
        .await
    }

    /// Empties every collection, keeping only the `users` entry if present.
    pub async fn reset(&self) -> Result<(), StoreError> {
        self.modify(|data| {
            let users = data.other.remove("users");
            data.tasks.clear();
            data.other.clear();
            if let Some(users) = users {
                data.other.insert("users".to_string(), users);
            }
            for name in EMPTY_COLLECTIONS {
                data.other
                    .insert((*name).to_string(), serde_json::Value::Array(Vec::new()));
            }
            Ok(())
        })
        .await
    }

    /// Runs one read-modify-write cycle under the write lock.
    ///
    /// The file is only rewritten when `f` succeeds.
    async fn modify<T>(
        &self,
        f: impl FnOnce(&mut DataFile) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self.lock.write().await;
        let mut data = self.read().await?;
        let out = f(&mut data)?;
        self.write(&data).await?;
        Ok(out)
    }

    async fn read(&self) -> Result<DataFile, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(DataFile::default()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DataFile::default()),
            Err(e) => Err(StoreError::Io {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    /// Writes to a sibling temp file, then renames over the data file.
    async fn write(&self, data: &DataFile) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(data)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| StoreError::Io {
                path: tmp.clone(),
                source: e,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::Io {
                path: self.path.clone(),
                source: e,
            })
    }
}

/// Validates a bulk payload against the stored tasks.
fn check_bulk(stored: &[Task], payload: &[Task]) -> Result<(), StoreError> {
    let mut seen = HashSet::with_capacity(payload.len());
    for task in payload {
        if !seen.insert(&task.id) {
            return Err(StoreError::RepeatedInPayload(task.id.clone()));
        }
        if stored
            .iter()
            .any(|s| s.id == task.id && s.user_id != task.user_id)
        {
            return Err(StoreError::OwnerChanged(task.id.clone()));
        }
    }
    Ok(())
}
