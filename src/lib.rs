//! Cascade - hierarchical task management with cascading completion
//!
//! Cascade organizes work as a forest of tasks: every task can carry
//! subtasks and declare dependencies on other tasks. Completing a task
//! completes its whole subtree; completing the last subtask completes
//! the parent. Deadlines drive automatic priority and status
//! assignment.

pub mod cli;
pub mod domain;
pub mod engine;
pub mod service;
pub mod store;

pub use domain::{Attachment, AttachmentId, Priority, Task, TaskError, TaskId, TaskStatus};
pub use service::{ListFilter, TaskService};
