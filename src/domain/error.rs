//! Error taxonomy for task operations
//!
//! Every service operation returns a typed result; validation failures
//! are detected before any graph mutation, so an `Err` always means the
//! graph is unchanged (blob IO being the one physical exception).

use thiserror::Error;

use super::id::{AttachmentId, TaskId};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("A task titled '{0}' already exists")]
    DuplicateTitle(String),

    #[error("Invalid subtask deadline: {0}")]
    InvalidDate(String),

    #[error("Parent task not found: {0}")]
    ParentNotFound(TaskId),

    #[error("Cannot add a subtask to completed task {0}")]
    ParentAlreadyCompleted(TaskId),

    #[error("Dependency would create a cycle: {0} -> {1}")]
    DependencyCycle(TaskId, TaskId),

    #[error("Task depends on '{0}' which is not completed")]
    DependencyNotSatisfied(String),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Attachment not found: {0}")]
    AttachmentNotFound(AttachmentId),

    #[error("Attachment storage failed: {0}")]
    Io(#[from] std::io::Error),
}

impl TaskError {
    /// Returns a short machine-readable kind tag, used in JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            TaskError::DuplicateTitle(_) => "duplicate_title",
            TaskError::InvalidDate(_) => "invalid_date",
            TaskError::ParentNotFound(_) => "parent_not_found",
            TaskError::ParentAlreadyCompleted(_) => "parent_already_completed",
            TaskError::DependencyCycle(_, _) => "dependency_cycle",
            TaskError::DependencyNotSatisfied(_) => "dependency_not_satisfied",
            TaskError::TaskNotFound(_) => "task_not_found",
            TaskError::AttachmentNotFound(_) => "attachment_not_found",
            TaskError::Io(_) => "io_failure",
        }
    }
}
