//! Hierarchical state machine: cascading completion, reopening,
//! subtree deletion and subtask creation
//!
//! All cascades run on explicit worklists so deep hierarchies cannot
//! overflow the stack. The cause strings recorded on cascaded
//! completions are part of the observable contract:
//! `"ParentCompleted:" + cause` for direct children and
//! `"GrandParentCompleted:" + cause` for every deeper descendant. The
//! deep-descendant string is constant below the first hop, it is not
//! re-derived per level.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::domain::{NewTask, Task, TaskError, TaskId};
use crate::store::TaskRepository;

use super::{assign, uniqueness};

/// Completes a task and cascades the completion
///
/// Fails with [`TaskError::DependencyNotSatisfied`] before any mutation
/// when a declared dependency is still open. On success the whole
/// subtree is completed (already-completed branches are skipped), and
/// ancestors whose children are now all complete are completed upward
/// with cause `"AllSubtasksCompleted"` until an ancestor with an
/// unfinished child (or one already complete) stops the walk.
pub fn complete(
    repo: &mut TaskRepository,
    id: &TaskId,
    cause: &str,
    now: DateTime<Utc>,
) -> Result<(), TaskError> {
    let task = repo.get(id).ok_or_else(|| TaskError::TaskNotFound(id.clone()))?;

    // Validate dependencies before touching anything
    for dep_id in task.depends_on.clone() {
        if let Some(dep) = repo.get(&dep_id) {
            if !dep.completed {
                return Err(TaskError::DependencyNotSatisfied(dep.title.clone()));
            }
        }
    }

    let children: Vec<TaskId> = {
        let task = repo
            .get_mut(id)
            .ok_or_else(|| TaskError::TaskNotFound(id.clone()))?;
        task.complete_with(cause, now);
        task.subtasks.clone()
    };

    // Downward cascade. Depth 1 children get the ParentCompleted cause,
    // everything deeper gets the (constant) GrandParentCompleted cause.
    let child_cause = format!("ParentCompleted:{}", cause);
    let deep_cause = format!("GrandParentCompleted:{}", cause);

    let mut worklist: Vec<(TaskId, bool)> = children.into_iter().map(|c| (c, true)).collect();
    while let Some((current, direct)) = worklist.pop() {
        let Some(task) = repo.get_mut(&current) else {
            continue;
        };
        // A completed branch is left alone entirely
        if task.completed {
            continue;
        }

        let cause = if direct { &child_cause } else { &deep_cause };
        task.complete_with(cause, now);
        worklist.extend(task.subtasks.iter().cloned().map(|c| (c, false)));
    }

    // Upward walk: complete each ancestor whose children are all done
    let mut next_parent = repo.parent_of(id);
    while let Some(parent_id) = next_parent {
        let Some(parent) = repo.get(&parent_id) else {
            break;
        };
        if parent.completed {
            break;
        }
        let all_done = parent
            .subtasks
            .iter()
            .all(|c| repo.get(c).map(|t| t.completed).unwrap_or(true));
        if !all_done {
            break;
        }

        if let Some(parent) = repo.get_mut(&parent_id) {
            parent.complete_with("AllSubtasksCompleted", now);
        }
        next_parent = repo.parent_of(&parent_id);
    }

    Ok(())
}

/// Reopens a task, cascading to direct children and completed ancestors
///
/// When the task is completed and all its direct children are
/// completed, exactly those children are reset (grandchildren are not).
/// Completed ancestors are reset all the way to the root. Finally the
/// task itself is reset and the assigner re-runs on it.
pub fn reopen(repo: &mut TaskRepository, id: &TaskId, now: DateTime<Utc>) -> Result<(), TaskError> {
    let task = repo.get(id).ok_or_else(|| TaskError::TaskNotFound(id.clone()))?;

    // Direct children reset, only from a fully-completed state
    if !task.subtasks.is_empty() && task.completed {
        let children = task.subtasks.clone();
        let all_done = children
            .iter()
            .all(|c| repo.get(c).map(|t| t.completed).unwrap_or(true));
        if all_done {
            for child_id in children {
                if let Some(child) = repo.get_mut(&child_id) {
                    child.reopen();
                }
            }
        }
    }

    // Completed ancestors reopen recursively to the root
    let mut next_parent = repo.parent_of(id);
    while let Some(parent_id) = next_parent {
        let Some(parent) = repo.get_mut(&parent_id) else {
            break;
        };
        if !parent.completed {
            break;
        }
        parent.reopen();
        next_parent = repo.parent_of(&parent_id);
    }

    if let Some(task) = repo.get_mut(id) {
        task.reopen();
        assign::assign(task, now);
    }

    Ok(())
}

/// Deletes a task and its entire subtree
///
/// Every removed node also loses its incoming edges: hierarchy and
/// dependency references from surviving tasks are scrubbed. Returns the
/// removed records (for blob cleanup), or `None` if the task does not
/// exist.
pub fn delete_subtree(repo: &mut TaskRepository, id: &TaskId) -> Option<Vec<Task>> {
    if !repo.contains(id) {
        return None;
    }

    // Collect the subtree with a worklist
    let mut doomed: HashSet<TaskId> = HashSet::new();
    let mut worklist = vec![id.clone()];
    while let Some(current) = worklist.pop() {
        if !doomed.insert(current.clone()) {
            continue;
        }
        if let Some(task) = repo.get(&current) {
            worklist.extend(task.subtasks.iter().cloned());
        }
    }

    let mut removed = Vec::with_capacity(doomed.len());
    for victim in &doomed {
        if let Some(task) = repo.remove(victim) {
            removed.push(task);
        }
    }

    // Drop dangling hierarchy/dependency edges from survivors,
    // including the deleted root's own parent edge
    repo.scrub_references(&doomed);

    Some(removed)
}

/// Creates a new task as a subtask of `parent_id`
///
/// The child deadline, when given, must lie within
/// `[parent.created_at, parent.deadline]`; a deadline within one day of
/// the parent's own appends a warning note to the parent. A child
/// without a deadline inherits the parent's verbatim. Category and
/// priority are inherited from the parent when the parent has them.
pub fn add_subtask(
    repo: &mut TaskRepository,
    parent_id: &TaskId,
    input: NewTask,
    now: DateTime<Utc>,
) -> Result<TaskId, TaskError> {
    let parent = repo
        .get(parent_id)
        .ok_or_else(|| TaskError::ParentNotFound(parent_id.clone()))?;

    if parent.completed {
        return Err(TaskError::ParentAlreadyCompleted(parent_id.clone()));
    }

    if let Some(title) = &input.title {
        uniqueness::check_available(repo, title, None)?;
    }

    let parent = repo
        .get(parent_id)
        .ok_or_else(|| TaskError::ParentNotFound(parent_id.clone()))?;

    // Deadline bounds check, plus a proximity warning for the parent
    let mut parent_warning = None;
    if let Some(child_deadline) = input.deadline {
        if child_deadline < parent.created_at {
            return Err(TaskError::InvalidDate(format!(
                "subtask deadline {} precedes parent creation {}",
                child_deadline, parent.created_at
            )));
        }
        if let Some(parent_deadline) = parent.deadline {
            if child_deadline > parent_deadline {
                return Err(TaskError::InvalidDate(format!(
                    "subtask deadline {} follows parent deadline {}",
                    child_deadline, parent_deadline
                )));
            }
            if child_deadline > parent_deadline - chrono::Duration::days(1) {
                parent_warning = Some(format!(
                    "Subtask deadline very close to parent deadline ({})",
                    child_deadline
                ));
            }
        }
    }

    let title = input
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| "Subtask".to_string());

    let mut child = Task::new(TaskId::new(&title, now), title, now);
    child.description = input.description.clone();
    child.deadline = input.deadline.or(parent.deadline);
    child.category = parent.category.clone();
    child.priority = parent.priority;

    let child_id = child.id.clone();
    assign::assign(&mut child, now);
    repo.save(child);

    if let Some(note) = parent_warning {
        repo.push_warning(parent_id, note);
    }
    repo.add_subtask_edge(parent_id, child_id.clone());

    Ok(child_id)
}
