//! Task domain model
//!
//! Tasks form two graphs at once: a hierarchy (parent -> subtasks, a
//! forest) and a dependency DAG (task -> tasks it depends on). The
//! `completed` flag is the authoritative terminality marker; `status` is
//! a presentation value derived from it except where the hierarchy
//! engine sets it directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::id::{AttachmentId, RefId, TaskId};

/// Status of a task
///
/// `InProgress` is a legal value that the engine's own transitions never
/// produce: reopening sets `ToDo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    ToDo,
    InProgress,
    Completed,
    Overdue,
}

impl TaskStatus {
    /// Returns a display label for the status
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::ToDo => "ToDo",
            TaskStatus::InProgress => "InProgress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Overdue => "Overdue",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "todo" | "to-do" | "to_do" => Ok(TaskStatus::ToDo),
            "inprogress" | "in-progress" | "in_progress" => Ok(TaskStatus::InProgress),
            "completed" | "done" => Ok(TaskStatus::Completed),
            "overdue" => Ok(TaskStatus::Overdue),
            other => Err(format!("unknown status: {}", other)),
        }
    }
}

/// Priority of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Urgent,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Returns a display label for the priority
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Urgent => "Urgent",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "urgent" => Ok(Priority::Urgent),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

/// Deadline-derived urgency tag, a denormalized duplicate of priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Urgency {
    pub fn label(&self) -> &'static str {
        match self {
            Urgency::High => "high",
            Urgency::Medium => "medium",
            Urgency::Low => "low",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Urgency::High),
            "medium" => Ok(Urgency::Medium),
            "low" => Ok(Urgency::Low),
            other => Err(format!("unknown urgency: {}", other)),
        }
    }
}

/// A file attached to a task
///
/// Owned by exactly one task; the bytes live in blob storage at `path`
/// and are created/deleted only through that task's attachment ops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub filename: String,
    pub path: String,
}

/// A work item in the task graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Human-readable title, globally unique case-insensitively
    pub title: String,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// When the task was created (immutable after creation)
    pub created_at: DateTime<Utc>,

    /// Optional deadline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,

    /// When the task was completed (set only while completed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Authoritative terminality flag
    #[serde(default)]
    pub completed: bool,

    /// Why the task entered the completed state (set only while completed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_cause: Option<String>,

    /// Accumulated warning notes (append-only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Deadline-derived urgency tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Urgency>,

    /// Current status; `None` until assigned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    /// Current priority; `None` until assigned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    /// Category reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<RefId>,

    /// Assignee reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<RefId>,

    /// Creator reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<RefId>,

    /// Ordered hierarchy children
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<TaskId>,

    /// Tasks this one depends on (must be acyclic)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<TaskId>,

    /// Attached files
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl Task {
    /// Creates a new task with the given ID and title
    pub fn new(id: TaskId, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            created_at,
            deadline: None,
            completed_at: None,
            completed: false,
            termination_cause: None,
            warnings: Vec::new(),
            urgency: None,
            status: None,
            priority: None,
            category: None,
            assignee: None,
            creator: None,
            subtasks: Vec::new(),
            depends_on: Vec::new(),
            attachments: Vec::new(),
        }
    }

    /// Marks the task completed with the given cause
    ///
    /// Keeps the completion fields consistent: `completed`, status,
    /// cause and completion time always move together.
    pub fn complete_with(&mut self, cause: &str, now: DateTime<Utc>) {
        self.completed = true;
        self.status = Some(TaskStatus::Completed);
        self.termination_cause = Some(cause.to_string());
        self.completed_at = Some(now);
    }

    /// Clears all completion state and resets status to ToDo
    pub fn reopen(&mut self) {
        self.completed = false;
        self.status = Some(TaskStatus::ToDo);
        self.termination_cause = None;
        self.completed_at = None;
    }

    /// Appends a subtask edge; duplicate edges are rejected silently
    pub fn add_subtask(&mut self, child: TaskId) -> bool {
        if self.subtasks.contains(&child) {
            return false;
        }
        self.subtasks.push(child);
        true
    }

    /// Appends a dependency edge; duplicate edges are rejected silently
    pub fn add_dependency(&mut self, dep: TaskId) -> bool {
        if self.depends_on.contains(&dep) {
            return false;
        }
        self.depends_on.push(dep);
        true
    }

    /// Appends a warning note; identical notes are kept once
    pub fn push_warning(&mut self, note: impl Into<String>) -> bool {
        let note = note.into();
        if self.warnings.contains(&note) {
            return false;
        }
        self.warnings.push(note);
        true
    }

    /// Appends an attachment record; duplicate ids are rejected silently
    pub fn push_attachment(&mut self, attachment: Attachment) -> bool {
        if self.attachments.iter().any(|a| a.id == attachment.id) {
            return false;
        }
        self.attachments.push(attachment);
        true
    }

    /// Removes an attachment record by id
    pub fn remove_attachment(&mut self, id: &AttachmentId) -> Option<Attachment> {
        let pos = self.attachments.iter().position(|a| &a.id == id)?;
        Some(self.attachments.remove(pos))
    }

    /// Returns true if the title or description contains `query`,
    /// case-insensitively
    pub fn matches_query(&self, query: &str) -> bool {
        let q = query.to_lowercase();
        if self.title.to_lowercase().contains(&q) {
            return true;
        }
        self.description
            .as_deref()
            .map(|d| d.to_lowercase().contains(&q))
            .unwrap_or(false)
    }
}

/// Input for creating a task (top-level or as a subtask)
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub category: Option<RefId>,
    pub assignee: Option<RefId>,
    pub creator: Option<RefId>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

/// Partial update for a task
///
/// Absent fields are left untouched. `warning` appends to the warning
/// list rather than replacing it. `completed` toggles route through the
/// hierarchy engine so completion state stays consistent.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub warning: Option<String>,
    pub urgency: Option<Urgency>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub category: Option<RefId>,
    pub assignee: Option<RefId>,
    pub completed: Option<bool>,
    pub termination_cause: Option<String>,
}

impl TaskPatch {
    /// Returns true if the patch carries no change at all
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.deadline.is_none()
            && self.warning.is_none()
            && self.urgency.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.assignee.is_none()
            && self.completed.is_none()
            && self.termination_cause.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_task(title: &str) -> Task {
        let now = Utc::now();
        Task::new(TaskId::new(title, now), title, now)
    }

    #[test]
    fn new_task_is_unassigned() {
        let task = make_task("Fresh");
        assert!(!task.completed);
        assert!(task.status.is_none());
        assert!(task.priority.is_none());
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn complete_sets_all_completion_fields() {
        let mut task = make_task("Finish");
        let now = Utc::now();
        task.complete_with("Manual", now);

        assert!(task.completed);
        assert_eq!(task.status, Some(TaskStatus::Completed));
        assert_eq!(task.termination_cause.as_deref(), Some("Manual"));
        assert_eq!(task.completed_at, Some(now));
    }

    #[test]
    fn reopen_clears_completion_fields() {
        let mut task = make_task("Again");
        task.complete_with("Manual", Utc::now());
        task.reopen();

        assert!(!task.completed);
        assert_eq!(task.status, Some(TaskStatus::ToDo));
        assert!(task.termination_cause.is_none());
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn duplicate_edges_rejected_silently() {
        let mut parent = make_task("Parent");
        let child = make_task("Child");

        assert!(parent.add_subtask(child.id.clone()));
        assert!(!parent.add_subtask(child.id.clone()));
        assert_eq!(parent.subtasks.len(), 1);

        assert!(parent.add_dependency(child.id.clone()));
        assert!(!parent.add_dependency(child.id));
        assert_eq!(parent.depends_on.len(), 1);
    }

    #[test]
    fn warnings_accumulate() {
        let mut task = make_task("Warned");
        assert!(task.push_warning("first"));
        assert!(task.push_warning("second"));
        assert!(!task.push_warning("first"));
        assert_eq!(task.warnings, vec!["first", "second"]);
    }

    #[test]
    fn query_matches_title_and_description() {
        let mut task = make_task("Quarterly Report");
        task.description = Some("Compile the NUMBERS".to_string());

        assert!(task.matches_query("quarterly"));
        assert!(task.matches_query("numbers"));
        assert!(!task.matches_query("missing"));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("ToDo".parse::<TaskStatus>(), Ok(TaskStatus::ToDo));
        assert_eq!("in-progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!("DONE".parse::<TaskStatus>(), Ok(TaskStatus::Completed));
        assert!("later".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn priority_labels() {
        assert_eq!(Priority::Urgent.label(), "Urgent");
        assert_eq!("low".parse::<Priority>(), Ok(Priority::Low));
    }

    #[test]
    fn serde_roundtrip() {
        let mut task = make_task("Persist me");
        task.deadline = Some(Utc::now());
        task.push_warning("close deadline");
        task.priority = Some(Priority::High);

        let json = serde_json::to_string(&task).unwrap();
        let parsed: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(task, parsed);
    }

    #[test]
    fn urgency_serializes_lowercase() {
        let json = serde_json::to_string(&Urgency::High).unwrap();
        assert_eq!(json, "\"high\"");
    }
}
