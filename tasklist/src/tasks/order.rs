//! Pure helpers over an ordered task list.

use tasklist_proto::task::Task;

/// Sorts by `order` ascending. Stable, so tasks sharing an order keep
/// their storage order.
pub fn sort_by_order(tasks: &mut [Task]) {
    tasks.sort_by_key(|t| t.order);
}

/// Rewrites `order` to `1..=N` following the current sequence.
///
/// Returns `true` if any task's order changed.
pub fn resequence(tasks: &mut [Task]) -> bool {
    let mut changed = false;
    for (position, task) in (1i64..).zip(tasks.iter_mut()) {
        if task.order != position {
            task.order = position;
            changed = true;
        }
    }
    changed
}

/// Removes the task at `from` and reinserts it at index `to` of the
/// shortened list (clamped to its length).
///
/// With `to` taken as the target's index before the removal, dragging down
/// lands the task after the target and dragging up lands it before.
pub fn move_to(tasks: &mut Vec<Task>, from: usize, to: usize) {
    if from >= tasks.len() {
        return;
    }
    let task = tasks.remove(from);
    let to = to.min(tasks.len());
    tasks.insert(to, task);
}

/// Order value for a task appended after `len` existing ones.
#[must_use]
pub fn next_order(len: usize) -> i64 {
    i64::try_from(len).map_or(i64::MAX, |n| n.saturating_add(1))
}
