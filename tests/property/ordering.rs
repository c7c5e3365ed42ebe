//! Property-based tests for task ordering.
//!
//! Uses proptest to verify:
//! 1. After any mix of creates, deletes and toggles, a successful drop
//!    leaves `order` equal to `1..=N`.
//! 2. A drop moves exactly one task and keeps every other task's relative
//!    position.
//! 3. A failed drop never changes the view.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::NaiveDate;
use proptest::prelude::*;
use tasklist::store::memory::MemoryTaskStore;
use tasklist::tasks::TaskListController;
use tasklist_proto::task::{TaskDraft, TaskId};

#[derive(Debug, Clone)]
enum Op {
    Create(String),
    Delete(usize),
    Toggle(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => "[a-z]{1,12}".prop_map(Op::Create),
        1 => any::<usize>().prop_map(Op::Delete),
        1 => any::<usize>().prop_map(Op::Toggle),
    ]
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
}

fn due() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
}

/// Applies `ops` to a fresh controller; indices wrap around the view.
async fn build(ops: &[Op]) -> TaskListController<MemoryTaskStore> {
    let mut ctl = TaskListController::new(MemoryTaskStore::new());
    ctl.load("s1").await.unwrap();
    for op in ops {
        let len = ctl.tasks().len();
        match op {
            Op::Create(title) => {
                ctl.create(TaskDraft::new(title.clone(), due())).await.unwrap();
            }
            Op::Delete(i) if len > 0 => {
                let id = ctl.tasks()[i % len].id.clone();
                ctl.delete(&id).await.unwrap();
            }
            Op::Toggle(i) if len > 0 => {
                let id = ctl.tasks()[i % len].id.clone();
                ctl.toggle_complete(&id).await.unwrap();
            }
            Op::Delete(_) | Op::Toggle(_) => {}
        }
    }
    ctl
}

fn ids(ctl: &TaskListController<MemoryTaskStore>) -> Vec<TaskId> {
    ctl.tasks().iter().map(|t| t.id.clone()).collect()
}

proptest! {
    #[test]
    fn drop_resequences_contiguously(
        ops in prop::collection::vec(arb_op(), 2..40),
        from in any::<usize>(),
        to in any::<usize>(),
    ) {
        runtime().block_on(async {
            let mut ctl = build(&ops).await;
            let len = ctl.tasks().len();
            prop_assume!(len >= 2);
            let (from, to) = (from % len, to % len);
            prop_assume!(from != to);

            let order = ids(&ctl);
            ctl.begin_drag(&order[from]);
            prop_assert!(ctl.drop_on(&order[to]).await.unwrap());

            let orders: Vec<i64> = ctl.tasks().iter().map(|t| t.order).collect();
            let expected: Vec<i64> = (1..).take(len).collect();
            prop_assert_eq!(orders, expected);

            // The store agrees with the view.
            let mut stored = ctl.store().tasks();
            stored.sort_by_key(|t| t.order);
            let stored_ids: Vec<TaskId> = stored.into_iter().map(|t| t.id).collect();
            prop_assert_eq!(stored_ids, ids(&ctl));
            Ok(())
        })?;
    }

    #[test]
    fn drop_keeps_relative_order_of_others(
        count in 2usize..12,
        from in any::<usize>(),
        to in any::<usize>(),
    ) {
        runtime().block_on(async {
            let ops: Vec<Op> = (0..count).map(|i| Op::Create(format!("task {i}"))).collect();
            let mut ctl = build(&ops).await;
            let (from, to) = (from % count, to % count);
            prop_assume!(from != to);

            let before = ids(&ctl);
            ctl.begin_drag(&before[from]);
            ctl.drop_on(&before[to]).await.unwrap();
            let after = ids(&ctl);

            prop_assert_eq!(&after[to], &before[from]);
            let others_before: Vec<&TaskId> =
                before.iter().filter(|id| **id != before[from]).collect();
            let others_after: Vec<&TaskId> =
                after.iter().filter(|id| **id != before[from]).collect();
            prop_assert_eq!(others_before, others_after);
            Ok(())
        })?;
    }

    #[test]
    fn failed_drop_never_changes_view(
        count in 2usize..10,
        from in any::<usize>(),
        to in any::<usize>(),
    ) {
        runtime().block_on(async {
            let ops: Vec<Op> = (0..count).map(|i| Op::Create(format!("task {i}"))).collect();
            let mut ctl = build(&ops).await;
            let before = ctl.tasks().to_vec();
            let (from, to) = (from % count, to % count);

            ctl.store().set_failing(true);
            ctl.begin_drag(&before[from].id);
            let _ = ctl.drop_on(&before[to].id).await;
            prop_assert_eq!(ctl.tasks(), before.as_slice());
            Ok(())
        })?;
    }
}
