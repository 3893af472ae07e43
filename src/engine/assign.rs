//! Deadline-driven priority and status inference
//!
//! Runs after every create, update, completion and reopen. First write
//! wins: a priority or status that is already set is never touched, so
//! the pass is idempotent and never overrides an explicit choice.

use chrono::{DateTime, Utc};

use crate::domain::{Priority, Task, TaskStatus, Urgency};

/// Whole days from `now` to `deadline`, clamped to zero for past
/// deadlines
fn days_until(now: DateTime<Utc>, deadline: DateTime<Utc>) -> i64 {
    (deadline - now).num_days().max(0)
}

/// Fills unset priority, urgency and status from the deadline
///
/// Priority (only when unset): <=1 day Urgent, <=3 High, <=7 Medium,
/// else Low; no deadline means Medium. The urgency tag is derived
/// alongside the auto-priority when a deadline exists and is left unset
/// otherwise. Status (only when unset): Completed when the task is
/// completed, Overdue when the deadline has passed, else ToDo.
pub fn assign(task: &mut Task, now: DateTime<Utc>) {
    if task.priority.is_none() {
        let priority = match task.deadline {
            Some(deadline) => {
                let days = days_until(now, deadline);

                task.urgency = Some(if days <= 1 {
                    Urgency::High
                } else if days <= 3 {
                    Urgency::Medium
                } else {
                    Urgency::Low
                });

                if days <= 1 {
                    Priority::Urgent
                } else if days <= 3 {
                    Priority::High
                } else if days <= 7 {
                    Priority::Medium
                } else {
                    Priority::Low
                }
            }
            None => Priority::Medium,
        };
        task.priority = Some(priority);
    }

    if task.status.is_none() {
        let status = if task.completed {
            TaskStatus::Completed
        } else if task.deadline.map(|d| now > d).unwrap_or(false) {
            TaskStatus::Overdue
        } else {
            TaskStatus::ToDo
        };
        task.status = Some(status);
    }
}
