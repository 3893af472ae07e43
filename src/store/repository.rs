//! Task repository over the graph store
//!
//! Encapsulates the write semantics of the node record: functional
//! (single-valued) attributes are replaced on every write, multi-valued
//! relations accumulate with silent duplicate rejection.

use crate::domain::{Attachment, Task, TaskId, TaskPatch};

use super::graph::GraphStore;
use std::collections::HashSet;

/// Maps the [`Task`] entity onto graph store nodes
#[derive(Debug, Default)]
pub struct TaskRepository {
    graph: GraphStore,
}

impl TaskRepository {
    /// Creates an empty repository
    pub fn new() -> Self {
        Self {
            graph: GraphStore::new(),
        }
    }

    /// Builds a repository from an existing task collection (snapshot load)
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            graph: GraphStore::from_tasks(tasks),
        }
    }

    /// Returns a task by id
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.graph.get(id)
    }

    /// Returns a mutable task by id
    pub fn get_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.graph.get_mut(id)
    }

    /// Iterates all tasks in id order
    pub fn list(&self) -> impl Iterator<Item = &Task> {
        self.graph.iter()
    }

    /// Inserts or fully replaces a task record
    pub fn save(&mut self, task: Task) {
        self.graph.insert(task);
    }

    /// Removes a task record
    pub fn remove(&mut self, id: &TaskId) -> Option<Task> {
        self.graph.remove(id)
    }

    /// Returns true if the task exists
    pub fn contains(&self, id: &TaskId) -> bool {
        self.graph.contains(id)
    }

    /// Number of stored tasks
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    /// Returns true if no tasks are stored
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Finds the hierarchy parent of a task
    pub fn parent_of(&self, id: &TaskId) -> Option<TaskId> {
        self.graph.parent_of(id)
    }

    /// Drops all edges pointing at the removed id set
    pub fn scrub_references(&mut self, removed: &HashSet<TaskId>) {
        self.graph.scrub_references(removed)
    }

    /// Applies the functional fields of a patch, replace-on-write
    ///
    /// The `warning` field is the one multi-valued attribute a patch can
    /// carry; it appends instead of replacing. Completion toggles are
    /// not applied here; they belong to the hierarchy engine.
    ///
    /// Returns false if the task does not exist.
    pub fn apply_patch(&mut self, id: &TaskId, patch: &TaskPatch) -> bool {
        let Some(task) = self.graph.get_mut(id) else {
            return false;
        };

        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        if let Some(description) = &patch.description {
            task.description = Some(description.clone());
        }
        if let Some(deadline) = patch.deadline {
            task.deadline = Some(deadline);
        }
        if let Some(warning) = &patch.warning {
            task.push_warning(warning.clone());
        }
        if let Some(urgency) = patch.urgency {
            task.urgency = Some(urgency);
        }
        if let Some(status) = patch.status {
            task.status = Some(status);
        }
        if let Some(priority) = patch.priority {
            task.priority = Some(priority);
        }
        if let Some(category) = &patch.category {
            task.category = Some(category.clone());
        }
        if let Some(assignee) = &patch.assignee {
            task.assignee = Some(assignee.clone());
        }

        true
    }

    /// Adds a hierarchy edge parent -> child; idempotent
    pub fn add_subtask_edge(&mut self, parent: &TaskId, child: TaskId) -> bool {
        self.graph
            .get_mut(parent)
            .map(|t| t.add_subtask(child))
            .unwrap_or(false)
    }

    /// Adds a dependency edge task -> dep; idempotent
    pub fn add_dependency_edge(&mut self, task: &TaskId, dep: TaskId) -> bool {
        self.graph
            .get_mut(task)
            .map(|t| t.add_dependency(dep))
            .unwrap_or(false)
    }

    /// Appends a warning note to a task; idempotent
    pub fn push_warning(&mut self, id: &TaskId, note: impl Into<String>) -> bool {
        self.graph
            .get_mut(id)
            .map(|t| t.push_warning(note))
            .unwrap_or(false)
    }

    /// Appends an attachment record to a task; idempotent
    pub fn push_attachment(&mut self, id: &TaskId, attachment: Attachment) -> bool {
        self.graph
            .get_mut(id)
            .map(|t| t.push_attachment(attachment))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, TaskStatus, Urgency};
    use chrono::Utc;

    fn make_task(title: &str) -> Task {
        let now = Utc::now();
        Task::new(TaskId::new(title, now), title, now)
    }

    #[test]
    fn save_and_list() {
        let mut repo = TaskRepository::new();
        repo.save(make_task("A"));
        repo.save(make_task("B"));

        assert_eq!(repo.list().count(), 2);
    }

    #[test]
    fn patch_replaces_functional_fields() {
        let mut repo = TaskRepository::new();
        let mut task = make_task("Original");
        task.description = Some("old".to_string());
        task.priority = Some(Priority::Low);
        let id = task.id.clone();
        repo.save(task);

        let patch = TaskPatch {
            title: Some("Renamed".to_string()),
            description: Some("new".to_string()),
            priority: Some(Priority::Urgent),
            status: Some(TaskStatus::InProgress),
            urgency: Some(Urgency::High),
            ..TaskPatch::default()
        };
        assert!(repo.apply_patch(&id, &patch));

        let task = repo.get(&id).unwrap();
        assert_eq!(task.title, "Renamed");
        assert_eq!(task.description.as_deref(), Some("new"));
        assert_eq!(task.priority, Some(Priority::Urgent));
        assert_eq!(task.status, Some(TaskStatus::InProgress));
        assert_eq!(task.urgency, Some(Urgency::High));
    }

    #[test]
    fn patch_appends_warning() {
        let mut repo = TaskRepository::new();
        let task = make_task("Warned");
        let id = task.id.clone();
        repo.save(task);

        let patch = TaskPatch {
            warning: Some("first".to_string()),
            ..TaskPatch::default()
        };
        repo.apply_patch(&id, &patch);
        let patch = TaskPatch {
            warning: Some("second".to_string()),
            ..TaskPatch::default()
        };
        repo.apply_patch(&id, &patch);

        assert_eq!(repo.get(&id).unwrap().warnings, vec!["first", "second"]);
    }

    #[test]
    fn patch_missing_task_returns_false() {
        let mut repo = TaskRepository::new();
        let ghost = make_task("Ghost");
        assert!(!repo.apply_patch(&ghost.id, &TaskPatch::default()));
    }

    #[test]
    fn edge_adds_are_idempotent() {
        let mut repo = TaskRepository::new();
        let parent = make_task("Parent");
        let child = make_task("Child");
        let parent_id = parent.id.clone();
        let child_id = child.id.clone();
        repo.save(parent);
        repo.save(child);

        assert!(repo.add_subtask_edge(&parent_id, child_id.clone()));
        assert!(!repo.add_subtask_edge(&parent_id, child_id.clone()));
        assert_eq!(repo.get(&parent_id).unwrap().subtasks.len(), 1);

        assert!(repo.add_dependency_edge(&child_id, parent_id.clone()));
        assert!(!repo.add_dependency_edge(&child_id, parent_id.clone()));
        assert_eq!(repo.get(&child_id).unwrap().depends_on.len(), 1);
    }
}
