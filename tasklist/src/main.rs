//! `TaskList`: personal task list on the command line.
//!
//! Loads the user's list from the task server, runs one operation and
//! prints the resulting list. Configuration via CLI flags, environment
//! variables, or config file (`~/.config/tasklist/config.toml`).
//!
//! ```bash
//! cargo run --bin tasklist -- --user s1 list
//! cargo run --bin tasklist -- --user s1 add "Study for midterm" --due 2025-05-02 --priority high
//! cargo run --bin tasklist -- --user s1 move task-a task-c
//!
//! # Without a server
//! cargo run --bin tasklist -- --offline --user s1 add "Try it" --due 2025-05-02
//! ```

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use tasklist::config::{CliArgs, ClientConfig, Command};
use tasklist::store::TaskStore;
use tasklist::store::http::HttpTaskStore;
use tasklist::store::memory::MemoryTaskStore;
use tasklist::tasks::{TaskError, TaskListController};
use tasklist::view;
use tasklist_proto::task::{AssignmentRef, TaskDraft, TaskId};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Logs go to a file so stdout only carries the rendered list.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    let Some(user_id) = config.user_id.clone() else {
        eprintln!("No user given: pass --user, set TASKLIST_USER, or add [user] id to the config file");
        return ExitCode::FAILURE;
    };
    let command = cli.command.clone().unwrap_or(Command::List);

    tracing::info!(user_id = %user_id, offline = cli.offline, ?command, "tasklist starting");

    let result = if cli.offline {
        run(MemoryTaskStore::new(), &user_id, command).await
    } else {
        match HttpTaskStore::new(&config.server_url, config.request_timeout) {
            Ok(store) => run(store, &user_id, command).await,
            Err(e) => Err(e.into()),
        }
    };

    match result {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("tasklist.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Loads the list, applies `command`, and returns the rendered result.
async fn run<S: TaskStore>(store: S, user_id: &str, command: Command) -> Result<String, TaskError> {
    let mut controller = TaskListController::new(store);
    controller.load(user_id).await?;

    let mut notice = None;
    match command {
        Command::List => {}
        Command::Add {
            title,
            due,
            priority,
            subject,
            description,
        } => {
            let mut draft = TaskDraft::new(title, due).with_priority(priority);
            if let Some(subject) = subject {
                draft = draft.with_subject(subject);
            }
            if let Some(description) = description {
                draft = draft.with_description(description);
            }
            let task = controller.create(draft).await?;
            notice = Some(format!("Created {}", task.id));
        }
        Command::AddAssignment {
            assignment_id,
            title,
            due,
            subject,
        } => {
            let assignment = AssignmentRef {
                id: assignment_id,
                title,
                subject,
                due_date: due,
            };
            let task = controller
                .create(TaskDraft::from_assignment(&assignment))
                .await?;
            notice = Some(format!("Added assignment {} as {}", assignment.id, task.id));
        }
        Command::Toggle { task_id } => {
            let completed = controller.toggle_complete(&TaskId::new(task_id)).await?;
            notice = Some(if completed { "Marked done" } else { "Marked not done" }.to_string());
        }
        Command::Delete { task_id } => {
            controller.delete(&TaskId::new(task_id)).await?;
            notice = Some("Deleted".to_string());
        }
        Command::Move { task_id, target_id } => {
            let task_id = TaskId::new(task_id);
            if !controller.begin_drag(&task_id) {
                return Err(TaskError::TaskNotFound(task_id));
            }
            let moved = controller.drop_on(&TaskId::new(target_id)).await?;
            notice = Some(if moved { "Moved" } else { "Nothing to move" }.to_string());
        }
    }

    let mut output = String::new();
    if let Some(notice) = notice {
        output.push_str(&notice);
        output.push('\n');
    }
    output.push_str(&view::render(&controller));
    Ok(output)
}
