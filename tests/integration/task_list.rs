//! End-to-end tests: `TaskListController` over `HttpTaskStore` against an
//! in-process task server backed by a temp data file.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use tasklist::store::StoreError;
use tasklist::store::http::HttpTaskStore;
use tasklist::tasks::{TaskError, TaskListController};
use tasklist_proto::task::{AssignmentRef, Priority, Task, TaskDraft, TaskId};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Harness {
    url: String,
    data_file: PathBuf,
    _dir: tempfile::TempDir,
    _handle: tokio::task::JoinHandle<()>,
}

/// Starts a task server on an OS-assigned port over an empty data file.
async fn start_server() -> Harness {
    let dir = tempfile::tempdir().expect("temp dir");
    let data_file = dir.path().join("maindata.json");
    let (addr, handle) = tasklist_server::api::start_server("127.0.0.1:0", data_file.clone())
        .await
        .expect("failed to start task server");
    Harness {
        url: format!("http://{addr}"),
        data_file,
        _dir: dir,
        _handle: handle,
    }
}

fn store(harness: &Harness) -> HttpTaskStore {
    HttpTaskStore::new(&harness.url, Duration::from_secs(5)).expect("http store")
}

fn due() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 15).unwrap()
}

/// Reads the tasks array straight from the data file.
fn stored_tasks(harness: &Harness) -> Vec<Task> {
    let raw = std::fs::read_to_string(&harness.data_file).expect("data file");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
    serde_json::from_value(value["tasks"].clone()).expect("tasks array")
}

fn stored_order(harness: &Harness, user: &str) -> Vec<(String, i64)> {
    let mut tasks: Vec<Task> = stored_tasks(harness)
        .into_iter()
        .filter(|t| t.user_id == user)
        .collect();
    tasks.sort_by_key(|t| t.order);
    tasks
        .into_iter()
        .map(|t| (t.id.as_str().to_string(), t.order))
        .collect()
}

async fn controller_with(harness: &Harness, titles: &[&str]) -> TaskListController<HttpTaskStore> {
    let mut ctl = TaskListController::new(store(harness));
    ctl.load("s1").await.unwrap();
    for title in titles {
        ctl.create(TaskDraft::new(*title, due())).await.unwrap();
    }
    ctl
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_persists_and_reload_preserves_order() {
    let harness = start_server().await;
    let ctl = controller_with(&harness, &["Essay", "Lab report", "Reading"]).await;
    let created: Vec<TaskId> = ctl.tasks().iter().map(|t| t.id.clone()).collect();

    let mut fresh = TaskListController::new(store(&harness));
    fresh.load("s1").await.unwrap();
    let loaded: Vec<TaskId> = fresh.tasks().iter().map(|t| t.id.clone()).collect();
    assert_eq!(loaded, created);

    let orders: Vec<i64> = fresh.tasks().iter().map(|t| t.order).collect();
    assert_eq!(orders, [1, 2, 3]);
}

#[tokio::test]
async fn drop_persists_full_reorder() {
    let harness = start_server().await;
    let mut ctl = controller_with(&harness, &["t1", "t2", "t3"]).await;
    let ids: Vec<TaskId> = ctl.tasks().iter().map(|t| t.id.clone()).collect();

    assert!(ctl.begin_drag(&ids[0]));
    assert!(ctl.drop_on(&ids[2]).await.unwrap());

    let expected = vec![
        (ids[1].to_string(), 1),
        (ids[2].to_string(), 2),
        (ids[0].to_string(), 3),
    ];
    assert_eq!(stored_order(&harness, "s1"), expected);
}

#[tokio::test]
async fn reorder_leaves_other_users_untouched() {
    let harness = start_server().await;

    let mut other = TaskListController::new(store(&harness));
    other.load("s2").await.unwrap();
    other.create(TaskDraft::new("Not mine", due())).await.unwrap();

    let mut ctl = controller_with(&harness, &["a", "b"]).await;
    let ids: Vec<TaskId> = ctl.tasks().iter().map(|t| t.id.clone()).collect();
    ctl.begin_drag(&ids[1]);
    ctl.drop_on(&ids[0]).await.unwrap();

    let theirs = stored_order(&harness, "s2");
    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0].1, 1);
}

#[tokio::test]
async fn toggle_and_delete_reach_the_data_file() {
    let harness = start_server().await;
    let mut ctl = controller_with(&harness, &["keep", "drop"]).await;
    let ids: Vec<TaskId> = ctl.tasks().iter().map(|t| t.id.clone()).collect();

    assert!(ctl.toggle_complete(&ids[0]).await.unwrap());
    ctl.delete(&ids[1]).await.unwrap();

    let stored = stored_tasks(&harness);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, ids[0]);
    assert!(stored[0].completed);
}

#[tokio::test]
async fn add_assignment_round_trips_origin() {
    let harness = start_server().await;
    let mut ctl = controller_with(&harness, &[]).await;
    let assignment = AssignmentRef {
        id: "a1".to_string(),
        title: "Chapter 3 problems".to_string(),
        subject: "Mathematics".to_string(),
        due_date: due(),
    };
    ctl.create(TaskDraft::from_assignment(&assignment))
        .await
        .unwrap();

    let stored = stored_tasks(&harness);
    assert_eq!(stored.len(), 1);
    assert!(stored[0].from_assignment);
    assert_eq!(stored[0].assignment_id.as_deref(), Some("a1"));
    assert_eq!(stored[0].priority, Priority::Medium);
    assert_eq!(stored[0].subject, "Mathematics");
}

#[tokio::test]
async fn server_failure_rolls_back_toggle_and_drop() {
    let harness = start_server().await;
    let mut ctl = controller_with(&harness, &["t1", "t2", "t3"]).await;
    let before = ctl.tasks().to_vec();
    let ids: Vec<TaskId> = before.iter().map(|t| t.id.clone()).collect();

    // A corrupt data file makes every request fail with 500.
    std::fs::write(&harness.data_file, "{ corrupt").unwrap();

    let err = ctl.toggle_complete(&ids[1]).await.unwrap_err();
    assert!(matches!(
        err,
        TaskError::Store(StoreError::Status { status: 500, .. })
    ));
    assert_eq!(ctl.tasks(), before.as_slice());

    ctl.begin_drag(&ids[0]);
    ctl.drop_on(&ids[2]).await.unwrap_err();
    assert_eq!(ctl.tasks(), before.as_slice());

    ctl.delete(&ids[2]).await.unwrap_err();
    assert_eq!(ctl.tasks(), before.as_slice());
}

#[tokio::test]
async fn unreachable_server_leaves_view_empty() {
    let harness = start_server().await;
    let mut ctl = controller_with(&harness, &["t1"]).await;

    let dead = HttpTaskStore::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let mut offline = TaskListController::new(dead);
    let err = offline.load("s1").await.unwrap_err();
    assert!(matches!(err, TaskError::Store(StoreError::Http(_))));
    assert!(offline.tasks().is_empty());

    // The reachable controller is unaffected.
    assert_eq!(ctl.tasks().len(), 1);
    ctl.load("s1").await.unwrap();
    assert_eq!(ctl.tasks().len(), 1);
}
