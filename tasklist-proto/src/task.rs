//! Task model shared by the task server and the client.
//!
//! Field names follow the JSON used by the data file and the HTTP API
//! (`userId`, `dueDate`, `fromAssignment`, ...), so a [`Task`] can be read
//! straight out of an existing `maindata.json`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Maximum allowed task title length in characters.
pub const MAX_TASK_TITLE_LENGTH: usize = 256;

/// Subject used when a draft does not name one.
pub const DEFAULT_SUBJECT: &str = "Other";

/// Identifier of a task.
///
/// Opaque string so ids already present in a data file are kept verbatim.
/// Freshly generated ids are `task-<uuid v7>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a new time-ordered task identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("task-{}", Uuid::now_v7()))
    }

    /// Wraps an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Shown in the warning banner while incomplete.
    High,
    /// Default priority.
    #[default]
    Medium,
    /// Low priority.
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// A user-owned to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Globally unique, immutable after creation.
    pub id: TaskId,
    /// Owner; never changes.
    pub user_id: String,
    pub title: String,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub subject: String,
    pub completed: bool,
    /// Display position among the owner's tasks (1-based after a reorder).
    pub order: i64,
    /// Whether the task was derived from an assignment.
    #[serde(default)]
    pub from_assignment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Reasons a [`TaskDraft`] cannot become a task.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum DraftError {
    /// Title is empty or whitespace only.
    #[error("task title cannot be empty")]
    TitleEmpty,
    /// Title exceeds [`MAX_TASK_TITLE_LENGTH`] characters.
    #[error("task title too long (max 256 characters)")]
    TitleTooLong,
    /// No due date was picked.
    #[error("task due date is required")]
    DueDateMissing,
}

/// An assignment as offered by the portal's "Add to Tasks" action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRef {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub due_date: NaiveDate,
}

/// User input for creating a task.
///
/// Title and due date are mandatory; everything else has a default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub subject: Option<String>,
    pub description: Option<String>,
    pub assignment_id: Option<String>,
}

impl TaskDraft {
    /// Starts a draft with a title and due date.
    pub fn new(title: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            due_date: Some(due_date),
            ..Self::default()
        }
    }

    /// Builds the draft the "Add to Tasks" action produces for an assignment.
    #[must_use]
    pub fn from_assignment(assignment: &AssignmentRef) -> Self {
        Self {
            title: assignment.title.clone(),
            due_date: Some(assignment.due_date),
            priority: Some(Priority::Medium),
            subject: Some(assignment.subject.clone()),
            description: None,
            assignment_id: Some(assignment.id.clone()),
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Checks the mandatory fields without building anything.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError`] when the trimmed title is empty or too long,
    /// or when no due date is set.
    pub fn validate(&self) -> Result<(), DraftError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DraftError::TitleEmpty);
        }
        if title.chars().count() > MAX_TASK_TITLE_LENGTH {
            return Err(DraftError::TitleTooLong);
        }
        if self.due_date.is_none() {
            return Err(DraftError::DueDateMissing);
        }
        Ok(())
    }

    /// Turns the draft into a task owned by `user_id` at position `order`.
    ///
    /// # Errors
    ///
    /// Same as [`validate`](Self::validate).
    pub fn into_task(self, user_id: &str, order: i64) -> Result<Task, DraftError> {
        self.validate()?;
        let due_date = self.due_date.ok_or(DraftError::DueDateMissing)?;
        let description = self.description.filter(|d| !d.trim().is_empty());
        Ok(Task {
            id: TaskId::generate(),
            user_id: user_id.to_string(),
            title: self.title.trim().to_string(),
            due_date,
            priority: self.priority.unwrap_or_default(),
            subject: self
                .subject
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            completed: false,
            order,
            from_assignment: self.assignment_id.is_some(),
            assignment_id: self.assignment_id,
            description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn task_id_generate_is_prefixed_and_unique() {
        let a = TaskId::generate();
        let b = TaskId::generate();
        assert!(a.as_str().starts_with("task-"));
        assert_eq!(a.as_str().len(), "task-".len() + 36);
        assert_ne!(a, b);
    }

    #[test]
    fn task_serializes_with_camel_case_fields() {
        let task = Task {
            id: TaskId::new("task-1"),
            user_id: "s1".to_string(),
            title: "Read chapter 4".to_string(),
            due_date: date(2025, 3, 14),
            priority: Priority::High,
            subject: "History".to_string(),
            completed: false,
            order: 1,
            from_assignment: false,
            assignment_id: None,
            description: None,
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["userId"], "s1");
        assert_eq!(json["dueDate"], "2025-03-14");
        assert_eq!(json["priority"], "high");
        assert_eq!(json["fromAssignment"], false);
        assert!(json.get("assignmentId").is_none());
        assert!(json.get("description").is_none());
    }

    #[test]
    fn task_parses_legacy_record_without_from_assignment() {
        let json = r#"{
            "id": "task-1700000000000",
            "userId": "s1",
            "title": "Lab report",
            "dueDate": "2025-01-20",
            "priority": "low",
            "subject": "Physics",
            "completed": true,
            "order": 3
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id.as_str(), "task-1700000000000");
        assert_eq!(task.priority, Priority::Low);
        assert!(!task.from_assignment);
        assert!(task.completed);
        assert_eq!(task.order, 3);
    }

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("medium".parse::<Priority>().unwrap(), Priority::Medium);
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn draft_requires_title() {
        let draft = TaskDraft::new("   ", date(2025, 1, 1));
        assert_eq!(draft.validate(), Err(DraftError::TitleEmpty));
    }

    #[test]
    fn draft_requires_due_date() {
        let draft = TaskDraft {
            title: "Essay".to_string(),
            ..TaskDraft::default()
        };
        assert_eq!(draft.validate(), Err(DraftError::DueDateMissing));
    }

    #[test]
    fn draft_title_length_counts_chars() {
        let ok: String = std::iter::repeat_n('ñ', MAX_TASK_TITLE_LENGTH).collect();
        assert!(TaskDraft::new(ok, date(2025, 1, 1)).validate().is_ok());

        let too_long: String = std::iter::repeat_n('ñ', MAX_TASK_TITLE_LENGTH + 1).collect();
        assert_eq!(
            TaskDraft::new(too_long, date(2025, 1, 1)).validate(),
            Err(DraftError::TitleTooLong)
        );
    }

    #[test]
    fn draft_defaults_priority_and_subject() {
        let task = TaskDraft::new("  Study for midterm ", date(2025, 5, 2))
            .into_task("s1", 4)
            .unwrap();
        assert_eq!(task.title, "Study for midterm");
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.subject, DEFAULT_SUBJECT);
        assert_eq!(task.order, 4);
        assert_eq!(task.user_id, "s1");
        assert!(!task.completed);
        assert!(!task.from_assignment);
    }

    #[test]
    fn draft_from_assignment_marks_origin() {
        let assignment = AssignmentRef {
            id: "a7".to_string(),
            title: "Quadratic worksheet".to_string(),
            subject: "Mathematics".to_string(),
            due_date: date(2025, 2, 11),
        };
        let task = TaskDraft::from_assignment(&assignment)
            .into_task("s1", 1)
            .unwrap();
        assert!(task.from_assignment);
        assert_eq!(task.assignment_id.as_deref(), Some("a7"));
        assert_eq!(task.subject, "Mathematics");
        assert_eq!(task.due_date, date(2025, 2, 11));
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn blank_description_is_dropped() {
        let task = TaskDraft::new("Essay", date(2025, 1, 1))
            .with_description("  ")
            .into_task("s1", 1)
            .unwrap();
        assert_eq!(task.description, None);
    }
}
