//! In-memory graph store for task nodes
//!
//! One owned store per service instance; nothing ambient or static. The
//! store holds the node records (fixed [`Task`] structs, so unknown
//! properties cannot be written) and answers the reverse-edge queries
//! the records themselves cannot: parent lookup and reference scrubbing.

use std::collections::{BTreeMap, HashSet};

use crate::domain::{Task, TaskId};

/// Keyed node storage with reverse-edge lookups
#[derive(Debug, Default)]
pub struct GraphStore {
    nodes: BTreeMap<TaskId, Task>,
}

impl GraphStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }

    /// Builds a store from an existing collection of tasks
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            nodes: tasks.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }

    /// Inserts or replaces a node
    pub fn insert(&mut self, task: Task) {
        self.nodes.insert(task.id.clone(), task);
    }

    /// Returns a node by id
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.nodes.get(id)
    }

    /// Returns a mutable node by id
    pub fn get_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.nodes.get_mut(id)
    }

    /// Removes a node, returning it
    pub fn remove(&mut self, id: &TaskId) -> Option<Task> {
        self.nodes.remove(id)
    }

    /// Returns true if a node exists
    pub fn contains(&self, id: &TaskId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Iterates all nodes in id order
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.nodes.values()
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the store holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Finds the hierarchy parent of a node
    ///
    /// Subtasks are only ever created under a single parent, so the
    /// first match is the only match.
    pub fn parent_of(&self, id: &TaskId) -> Option<TaskId> {
        self.nodes
            .values()
            .find(|t| t.subtasks.contains(id))
            .map(|t| t.id.clone())
    }

    /// Drops every hierarchy and dependency edge pointing at any id in
    /// `removed` from the remaining nodes
    ///
    /// Only edges targeting removed ids are dropped; sibling edges on
    /// the same node survive.
    pub fn scrub_references(&mut self, removed: &HashSet<TaskId>) {
        for task in self.nodes.values_mut() {
            task.subtasks.retain(|id| !removed.contains(id));
            task.depends_on.retain(|id| !removed.contains(id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_task(title: &str) -> Task {
        let now = Utc::now();
        Task::new(TaskId::new(title, now), title, now)
    }

    #[test]
    fn insert_and_get() {
        let mut store = GraphStore::new();
        let task = make_task("One");
        let id = task.id.clone();

        store.insert(task);
        assert!(store.contains(&id));
        assert_eq!(store.get(&id).unwrap().title, "One");
    }

    #[test]
    fn parent_lookup() {
        let mut store = GraphStore::new();
        let mut parent = make_task("Parent");
        let child = make_task("Child");
        parent.add_subtask(child.id.clone());

        let parent_id = parent.id.clone();
        let child_id = child.id.clone();
        store.insert(parent);
        store.insert(child);

        assert_eq!(store.parent_of(&child_id), Some(parent_id.clone()));
        assert_eq!(store.parent_of(&parent_id), None);
    }

    #[test]
    fn scrub_drops_only_edges_to_removed_nodes() {
        let mut store = GraphStore::new();
        let keep = make_task("Keep");
        let gone = make_task("Gone");
        let mut holder = make_task("Holder");
        holder.add_subtask(keep.id.clone());
        holder.add_subtask(gone.id.clone());
        holder.add_dependency(keep.id.clone());
        holder.add_dependency(gone.id.clone());

        let keep_id = keep.id.clone();
        let gone_id = gone.id.clone();
        let holder_id = holder.id.clone();
        store.insert(keep);
        store.insert(gone);
        store.insert(holder);

        store.remove(&gone_id);
        let removed: HashSet<_> = [gone_id].into_iter().collect();
        store.scrub_references(&removed);

        let holder = store.get(&holder_id).unwrap();
        assert_eq!(holder.subtasks, vec![keep_id.clone()]);
        assert_eq!(holder.depends_on, vec![keep_id]);
    }
}
