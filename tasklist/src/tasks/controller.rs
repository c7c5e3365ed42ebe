//! Task list controller for one user's ordered to-do list.
//!
//! `TaskListController` holds the view (sorted by `order`) and the pending
//! drag, applies every mutation optimistically and rolls the view back to a
//! snapshot when the store call fails.

use tasklist_proto::task::{Priority, Task, TaskDraft, TaskId};

use super::TaskError;
use super::order;
use crate::store::{StoreError, TaskStore};

/// Ordered, in-memory view of one user's tasks.
///
/// The store stays the source of truth; the view is a cache that is only
/// ever ahead of the store while a call is in flight.
pub struct TaskListController<S> {
    store: S,
    /// Owner of the loaded list, `None` until [`load`](Self::load).
    user_id: Option<String>,
    /// Current view, in display order.
    tasks: Vec<Task>,
    /// Task picked up by [`begin_drag`](Self::begin_drag).
    dragged: Option<TaskId>,
}

impl<S: TaskStore> TaskListController<S> {
    /// Creates a controller with an empty view over `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
            user_id: None,
            tasks: Vec::new(),
            dragged: None,
        }
    }

    /// The store this controller persists through.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Owner of the loaded list.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Current view in display order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Task currently being dragged, if any.
    #[must_use]
    pub const fn dragged(&self) -> Option<&TaskId> {
        self.dragged.as_ref()
    }

    /// Number of tasks not yet completed.
    #[must_use]
    pub fn remaining_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }

    /// Incomplete high-priority tasks, in display order.
    #[must_use]
    pub fn high_priority_pending(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.priority == Priority::High && !t.completed)
            .collect()
    }

    /// Replaces the view with `user_id`'s tasks sorted by `order`.
    ///
    /// On failure the view is left empty.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Store`] if the tasks cannot be fetched.
    pub async fn load(&mut self, user_id: &str) -> Result<(), TaskError> {
        self.user_id = Some(user_id.to_string());
        self.tasks.clear();
        self.dragged = None;

        match self.store.list(user_id).await {
            Ok(mut tasks) => {
                order::sort_by_order(&mut tasks);
                tracing::debug!(user_id, count = tasks.len(), "tasks loaded");
                self.tasks = tasks;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "failed to load tasks");
                Err(e.into())
            }
        }
    }

    /// Picks up a task for relocation.
    ///
    /// Returns `false` (and changes nothing) while another drag is pending
    /// or when the task is not in the view.
    pub fn begin_drag(&mut self, task_id: &TaskId) -> bool {
        if self.dragged.is_some() || self.position(task_id).is_none() {
            return false;
        }
        self.dragged = Some(task_id.clone());
        true
    }

    /// Abandons a pending drag without touching the view.
    pub fn cancel_drag(&mut self) {
        self.dragged = None;
    }

    /// Drops the dragged task onto `target_id`.
    ///
    /// The dragged task takes the target's index (measured before the
    /// dragged task is lifted out), every task is renumbered `1..=N`, and
    /// the whole list is persisted in one bulk call. The drag ends either
    /// way. Returns `Ok(false)` when nothing was moved: no drag pending,
    /// dropped on itself, or either task missing from the view.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Store`] if persisting fails; the previous order
    /// is restored first.
    pub async fn drop_on(&mut self, target_id: &TaskId) -> Result<bool, TaskError> {
        let Some(dragged) = self.dragged.take() else {
            return Ok(false);
        };
        if dragged == *target_id {
            return Ok(false);
        }
        let (Some(from), Some(to)) = (self.position(&dragged), self.position(target_id)) else {
            return Ok(false);
        };

        let snapshot = self.tasks.clone();
        order::move_to(&mut self.tasks, from, to);
        order::resequence(&mut self.tasks);

        if let Err(e) = self.store.replace_all(&self.tasks).await {
            return Err(self.rollback(snapshot, "reorder", e));
        }
        tracing::debug!(task_id = %dragged, target = %target_id, "tasks reordered");
        Ok(true)
    }

    /// Flips `completed` on one task and persists it.
    ///
    /// Returns the new `completed` value.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::TaskNotFound`] without any store call if the
    /// task is not in the view, or [`TaskError::Store`] after restoring the
    /// view if persisting fails.
    pub async fn toggle_complete(&mut self, task_id: &TaskId) -> Result<bool, TaskError> {
        let index = self
            .position(task_id)
            .ok_or_else(|| TaskError::TaskNotFound(task_id.clone()))?;

        let snapshot = self.tasks.clone();
        let task = &mut self.tasks[index];
        task.completed = !task.completed;
        let completed = task.completed;

        if let Err(e) = self.store.update(&self.tasks[index]).await {
            return Err(self.rollback(snapshot, "toggle", e));
        }
        tracing::debug!(task_id = %task_id, completed, "task toggled");
        Ok(completed)
    }

    /// Removes a task from the view and the store.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::TaskNotFound`] without any store call if the
    /// task is not in the view, or [`TaskError::Store`] after putting the
    /// task back in its old position if persisting fails.
    pub async fn delete(&mut self, task_id: &TaskId) -> Result<(), TaskError> {
        let index = self
            .position(task_id)
            .ok_or_else(|| TaskError::TaskNotFound(task_id.clone()))?;

        let snapshot = self.tasks.clone();
        self.tasks.remove(index);
        if self.dragged.as_ref() == Some(task_id) {
            self.dragged = None;
        }

        if let Err(e) = self.store.delete(task_id).await {
            return Err(self.rollback(snapshot, "delete", e));
        }
        tracing::debug!(task_id = %task_id, "task deleted");
        Ok(())
    }

    /// Creates a task from `draft` at the end of the list.
    ///
    /// Existing tasks are renumbered `1..=N` first and the new task gets
    /// `N+1`. When the renumbering changed anything the whole list goes out
    /// in one bulk call, otherwise only the new task is posted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Invalid`] (no state change, no store call) for a
    /// blank title or missing due date, [`TaskError::NotLoaded`] before
    /// [`load`](Self::load), or [`TaskError::Store`] after restoring the
    /// view if persisting fails.
    pub async fn create(&mut self, draft: TaskDraft) -> Result<Task, TaskError> {
        draft.validate()?;
        let user_id = self.user_id.as_deref().ok_or(TaskError::NotLoaded)?;
        let task = draft.into_task(user_id, order::next_order(self.tasks.len()))?;

        let snapshot = self.tasks.clone();
        let renumbered = order::resequence(&mut self.tasks);
        self.tasks.push(task.clone());

        let persisted = if renumbered {
            self.store.replace_all(&self.tasks).await.map(|_| ())
        } else {
            self.store.create(&task).await.map(|_| ())
        };
        if let Err(e) = persisted {
            return Err(self.rollback(snapshot, "create", e));
        }
        tracing::debug!(
            task_id = %task.id,
            order = task.order,
            from_assignment = task.from_assignment,
            "task created"
        );
        Ok(task)
    }

    fn position(&self, task_id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == *task_id)
    }

    /// Restores the pre-mutation view after a failed store call.
    fn rollback(&mut self, snapshot: Vec<Task>, operation: &str, error: StoreError) -> TaskError {
        tracing::warn!(operation, error = %error, "persist failed, restoring task view");
        self.tasks = snapshot;
        TaskError::Store(error)
    }
}
