//! In-process task store.
//!
//! Mirrors the task server's semantics (duplicate and owner checks, bulk
//! upsert, idempotent delete) without any I/O. Rejections carry the status
//! the server would have returned. It can be switched to fail every call,
//! and it counts calls, so tests can check both rollback and "no request
//! was made".

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tasklist_proto::task::{Task, TaskId};

use super::{StoreError, TaskStore};

/// [`TaskStore`] holding tasks in memory.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tasks: Mutex<Vec<Task>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl MemoryTaskStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `tasks`.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            ..Self::default()
        }
    }

    /// Makes every following call fail with [`StoreError::Unavailable`]
    /// (or succeed again when `false`).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of calls received so far, failed ones included.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Copy of everything currently stored.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.lock().clone()
    }

    /// Counts the call and fails it if the store is switched off.
    fn begin(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

impl TaskStore for MemoryTaskStore {
    async fn list(&self, user_id: &str) -> Result<Vec<Task>, StoreError> {
        self.begin()?;
        Ok(self
            .tasks
            .lock()
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create(&self, task: &Task) -> Result<Task, StoreError> {
        self.begin()?;
        let mut tasks = self.tasks.lock();
        if tasks.iter().any(|t| t.id == task.id) {
            return Err(rejected(409, format!("Task already exists: {}", task.id)));
        }
        tasks.push(task.clone());
        drop(tasks);
        Ok(task.clone())
    }

    async fn update(&self, task: &Task) -> Result<Task, StoreError> {
        self.begin()?;
        let mut tasks = self.tasks.lock();
        let slot = tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| StoreError::NotFound(task.id.clone()))?;
        *slot = task.clone();
        drop(tasks);
        Ok(task.clone())
    }

    async fn delete(&self, id: &TaskId) -> Result<(), StoreError> {
        self.begin()?;
        self.tasks.lock().retain(|t| t.id != *id);
        Ok(())
    }

    async fn replace_all(&self, tasks: &[Task]) -> Result<Vec<Task>, StoreError> {
        self.begin()?;
        let mut stored = self.tasks.lock();
        let mut seen = HashSet::with_capacity(tasks.len());
        for task in tasks {
            if !seen.insert(&task.id) {
                return Err(rejected(400, format!("task {} appears more than once", task.id)));
            }
            if stored
                .iter()
                .any(|s| s.id == task.id && s.user_id != task.user_id)
            {
                return Err(rejected(400, format!("userId of task {} cannot change", task.id)));
            }
        }
        stored.retain(|s| !tasks.iter().any(|t| t.id == s.id));
        stored.extend(tasks.iter().cloned());
        drop(stored);
        Ok(tasks.to_vec())
    }
}

/// The error the task server would answer with.
fn rejected(status: u16, message: String) -> StoreError {
    StoreError::Status { status, message }
}
