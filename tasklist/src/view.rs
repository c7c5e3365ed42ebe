//! Plain-text rendering of a task list.

use std::fmt::Write as _;

use tasklist_proto::task::{Priority, Task};

use crate::store::TaskStore;
use crate::tasks::TaskListController;

/// Renders the list the way the dashboard card shows it: the high-priority
/// banner, the remaining count, then one line per task.
#[must_use]
pub fn render<S: TaskStore>(controller: &TaskListController<S>) -> String {
    let mut out = String::new();

    let high = controller.high_priority_pending().len();
    if high > 0 {
        let _ = writeln!(out, "! You have {high} high priority task(s)");
    }
    let _ = writeln!(out, "My Tasks ({} tasks remaining)", controller.remaining_count());

    if controller.tasks().is_empty() {
        out.push_str("  (no tasks)\n");
    }
    for task in controller.tasks() {
        out.push_str(&render_line(task));
        out.push('\n');
    }
    out
}

/// One task as `  [x] Title  (Subject, due 2025-03-01)  HIGH  <id>`.
#[must_use]
pub fn render_line(task: &Task) -> String {
    let check = if task.completed { 'x' } else { ' ' };
    let priority = match task.priority {
        Priority::High => "HIGH".to_string(),
        other => other.to_string(),
    };
    format!(
        "  [{check}] {}  ({}, due {})  {priority}  <{}>",
        task.title,
        task.subject,
        task.due_date.format("%Y-%m-%d"),
        task.id
    )
}
