//! TaskService: the public operation set over the task graph
//!
//! One service owns one graph. Writers are serialized behind a single
//! `RwLock` so cascading mutations are never interleaved; reads share
//! the lock and never observe a graph mid-mutation. Snapshot write-back
//! happens after every mutation, best-effort: a failed write never
//! fails the operation.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::domain::{
    Attachment, AttachmentId, NewTask, Priority, RefId, Task, TaskError, TaskId, TaskPatch,
    TaskStatus,
};
use crate::engine::{assign, cycles, hierarchy, uniqueness};
use crate::store::{BlobStore, SnapshotStore, TaskRepository};

/// Filters for [`TaskService::list`]
///
/// Enumerated filters match by equality against the task's resolved
/// label; `query` is a case-insensitive substring match over title and
/// description.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub category: Option<RefId>,
    pub query: Option<String>,
}

impl ListFilter {
    fn matches(&self, task: &Task) -> bool {
        if let Some(status) = self.status {
            if task.status != Some(status) {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if task.priority != Some(priority) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if task.category.as_ref() != Some(category) {
                return false;
            }
        }
        if let Some(query) = &self.query {
            if !task.matches_query(query) {
                return false;
            }
        }
        true
    }
}

/// Façade composing the validators, the assigner and the hierarchy
/// engine into the public operation set
pub struct TaskService {
    repo: RwLock<TaskRepository>,
    snapshot: Option<SnapshotStore>,
    blobs: Option<BlobStore>,
}

impl TaskService {
    /// Creates an in-memory service with no persistence side channels
    pub fn in_memory() -> Self {
        Self {
            repo: RwLock::new(TaskRepository::new()),
            snapshot: None,
            blobs: None,
        }
    }

    /// Creates a service over an existing repository
    pub fn with_repository(repo: TaskRepository) -> Self {
        Self {
            repo: RwLock::new(repo),
            snapshot: None,
            blobs: None,
        }
    }

    /// Attaches a snapshot store; the current graph is loaded from it
    pub fn with_snapshot(mut self, snapshot: SnapshotStore) -> anyhow::Result<Self> {
        let tasks = snapshot.read_all()?;
        self.repo = RwLock::new(TaskRepository::from_tasks(tasks));
        self.snapshot = Some(snapshot);
        Ok(self)
    }

    /// Attaches blob storage for attachments
    pub fn with_blobs(mut self, blobs: BlobStore) -> Self {
        self.blobs = Some(blobs);
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, TaskRepository> {
        self.repo.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TaskRepository> {
        self.repo.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Best-effort snapshot write-back; never fails the mutation
    fn persist(&self, repo: &TaskRepository) {
        if let Some(snapshot) = &self.snapshot {
            let _ = snapshot.write_all(repo.list());
        }
    }

    /// Creates a top-level task
    pub fn create(&self, input: NewTask) -> Result<Task, TaskError> {
        let mut repo = self.write();
        let now = Utc::now();

        if let Some(title) = &input.title {
            uniqueness::check_available(&repo, title, None)?;
        }

        let title = input
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Untitled".to_string());

        let mut task = Task::new(TaskId::new(&title, now), title, now);
        task.description = input.description;
        task.deadline = input.deadline;
        task.status = input.status;
        task.priority = input.priority;
        task.category = input.category;
        task.assignee = input.assignee;
        task.creator = input.creator;
        assign::assign(&mut task, now);

        let view = task.clone();
        repo.save(task);
        self.persist(&repo);

        Ok(view)
    }

    /// Returns a task by id
    pub fn get(&self, id: &TaskId) -> Result<Task, TaskError> {
        self.read()
            .get(id)
            .cloned()
            .ok_or_else(|| TaskError::TaskNotFound(id.clone()))
    }

    /// Lists tasks matching the filter, in id order
    pub fn list(&self, filter: &ListFilter) -> Vec<Task> {
        self.read()
            .list()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect()
    }

    /// Applies a partial update
    ///
    /// A `completed` toggle in the patch routes through the hierarchy
    /// engine, so cascades and the dependency precondition apply exactly
    /// as they do for `complete`/`reopen`.
    pub fn update(&self, id: &TaskId, patch: TaskPatch) -> Result<Task, TaskError> {
        let mut repo = self.write();
        let now = Utc::now();

        if !repo.contains(id) {
            return Err(TaskError::TaskNotFound(id.clone()));
        }

        if let Some(title) = &patch.title {
            uniqueness::check_available(&repo, title, Some(id))?;
        }

        match patch.completed {
            Some(true) => {
                let already = repo.get(id).map(|t| t.completed).unwrap_or(false);
                if already {
                    // Only replace the recorded cause when the patch
                    // actually carries one
                    if let Some(cause) = &patch.termination_cause {
                        if let Some(task) = repo.get_mut(id) {
                            task.termination_cause = Some(cause.clone());
                        }
                    }
                } else {
                    let cause = patch.termination_cause.as_deref().unwrap_or("Manual");
                    hierarchy::complete(&mut repo, id, cause, now)?;
                }
            }
            Some(false) => {
                hierarchy::reopen(&mut repo, id, now)?;
            }
            None => {}
        }

        repo.apply_patch(id, &patch);
        if let Some(task) = repo.get_mut(id) {
            assign::assign(task, now);
        }

        self.persist(&repo);
        repo.get(id)
            .cloned()
            .ok_or_else(|| TaskError::TaskNotFound(id.clone()))
    }

    /// Deletes a task and its whole subtree; returns false when the
    /// task does not exist
    pub fn delete(&self, id: &TaskId) -> bool {
        let mut repo = self.write();
        let Some(removed) = hierarchy::delete_subtree(&mut repo, id) else {
            return false;
        };

        // Blob cleanup is best-effort, like the snapshot
        if let Some(blobs) = &self.blobs {
            for task in &removed {
                for attachment in &task.attachments {
                    let _ = blobs.delete(std::path::Path::new(&attachment.path));
                }
            }
        }

        self.persist(&repo);
        true
    }

    /// Creates a task as a subtask of `parent`
    pub fn add_subtask(&self, parent: &TaskId, input: NewTask) -> Result<Task, TaskError> {
        let mut repo = self.write();
        let child = hierarchy::add_subtask(&mut repo, parent, input, Utc::now())?;
        self.persist(&repo);
        repo.get(&child)
            .cloned()
            .ok_or_else(|| TaskError::TaskNotFound(child.clone()))
    }

    /// Declares that `id` depends on `depends_on`
    pub fn add_dependency(&self, id: &TaskId, depends_on: &TaskId) -> Result<Task, TaskError> {
        let mut repo = self.write();

        if !repo.contains(id) {
            return Err(TaskError::TaskNotFound(id.clone()));
        }
        if !repo.contains(depends_on) {
            return Err(TaskError::TaskNotFound(depends_on.clone()));
        }

        cycles::check_acyclic(&repo, id, depends_on)?;
        repo.add_dependency_edge(id, depends_on.clone());

        self.persist(&repo);
        repo.get(id)
            .cloned()
            .ok_or_else(|| TaskError::TaskNotFound(id.clone()))
    }

    /// Completes a task (cause defaults to "Manual") with full cascade
    pub fn complete(&self, id: &TaskId, cause: Option<&str>) -> Result<Task, TaskError> {
        let mut repo = self.write();
        let now = Utc::now();

        hierarchy::complete(&mut repo, id, cause.unwrap_or("Manual"), now)?;
        if let Some(task) = repo.get_mut(id) {
            assign::assign(task, now);
        }

        self.persist(&repo);
        repo.get(id)
            .cloned()
            .ok_or_else(|| TaskError::TaskNotFound(id.clone()))
    }

    /// Reopens a task with full cascade
    pub fn reopen(&self, id: &TaskId) -> Result<Task, TaskError> {
        let mut repo = self.write();

        hierarchy::reopen(&mut repo, id, Utc::now())?;

        self.persist(&repo);
        repo.get(id)
            .cloned()
            .ok_or_else(|| TaskError::TaskNotFound(id.clone()))
    }

    /// Stores attachment bytes and records them on the task
    pub fn add_attachment(
        &self,
        id: &TaskId,
        filename: &str,
        bytes: &[u8],
    ) -> Result<Attachment, TaskError> {
        let mut repo = self.write();

        if !repo.contains(id) {
            return Err(TaskError::TaskNotFound(id.clone()));
        }

        let blobs = self.blobs.as_ref().ok_or_else(|| {
            TaskError::Io(std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "no blob storage configured",
            ))
        })?;

        let attachment_id = AttachmentId::new(filename, Utc::now());
        let stored_name = BlobStore::storage_name(&attachment_id, filename);
        let path = blobs.store(&attachment_id, filename, bytes)?;

        let attachment = Attachment {
            id: attachment_id,
            filename: stored_name,
            path: path.display().to_string(),
        };
        repo.push_attachment(id, attachment.clone());

        self.persist(&repo);
        Ok(attachment)
    }

    /// Removes an attachment record and its blob
    ///
    /// Returns true when a record was removed; false when the task has
    /// no such attachment. Blob deletion is best-effort.
    pub fn remove_attachment(
        &self,
        id: &TaskId,
        attachment_id: &AttachmentId,
    ) -> Result<bool, TaskError> {
        let mut repo = self.write();

        let task = repo
            .get_mut(id)
            .ok_or_else(|| TaskError::TaskNotFound(id.clone()))?;

        let Some(attachment) = task.remove_attachment(attachment_id) else {
            return Ok(false);
        };

        if let Some(blobs) = &self.blobs {
            let _ = blobs.delete(std::path::Path::new(&attachment.path));
        }

        self.persist(&repo);
        Ok(true)
    }
}
