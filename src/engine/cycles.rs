//! Dependency cycle prevention
//!
//! The dependency edge set must stay a DAG. Before an edge `task ->
//! depends_on` is written, we check reachability over the existing
//! edges with petgraph: if `task` can be reached from `depends_on`, the
//! new edge would close a cycle and the operation is rejected with no
//! mutation. A self-edge is the trivial cycle.

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use crate::domain::{TaskError, TaskId};
use crate::store::TaskRepository;

/// Reachability view over the current dependency edge set
struct DependencyEdges {
    graph: DiGraph<TaskId, ()>,
    node_map: HashMap<TaskId, NodeIndex>,
}

impl DependencyEdges {
    /// Builds the edge set from the repository
    ///
    /// Edge direction follows the declaration: task -> task it depends
    /// on.
    fn from_repo(repo: &TaskRepository) -> Self {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();

        for task in repo.list() {
            let idx = graph.add_node(task.id.clone());
            node_map.insert(task.id.clone(), idx);
        }

        for task in repo.list() {
            let from = node_map[&task.id];
            for dep in &task.depends_on {
                if let Some(&to) = node_map.get(dep) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        Self { graph, node_map }
    }

    /// True iff `target` is reachable from `start` over dependency edges
    fn reachable(&self, start: &TaskId, target: &TaskId) -> bool {
        let (Some(&start), Some(&target)) = (self.node_map.get(start), self.node_map.get(target))
        else {
            return false;
        };
        has_path_connecting(&self.graph, start, target, None)
    }
}

/// Returns true if adding `task -> depends_on` would create a cycle
pub fn would_create_cycle(repo: &TaskRepository, task: &TaskId, depends_on: &TaskId) -> bool {
    DependencyEdges::from_repo(repo).reachable(depends_on, task)
}

/// Validates that `task -> depends_on` keeps the edge set acyclic
pub fn check_acyclic(
    repo: &TaskRepository,
    task: &TaskId,
    depends_on: &TaskId,
) -> Result<(), TaskError> {
    if would_create_cycle(repo, task, depends_on) {
        return Err(TaskError::DependencyCycle(
            task.clone(),
            depends_on.clone(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Task;
    use chrono::Utc;

    fn make_task(title: &str) -> Task {
        let now = Utc::now();
        Task::new(TaskId::new(title, now), title, now)
    }

    #[test]
    fn no_cycle_in_fresh_graph() {
        let mut repo = TaskRepository::new();
        let a = make_task("A");
        let b = make_task("B");
        let (a_id, b_id) = (a.id.clone(), b.id.clone());
        repo.save(a);
        repo.save(b);

        assert!(!would_create_cycle(&repo, &a_id, &b_id));
    }

    #[test]
    fn direct_cycle_detected() {
        let mut repo = TaskRepository::new();
        let a = make_task("A");
        let mut b = make_task("B");
        b.add_dependency(a.id.clone());
        let (a_id, b_id) = (a.id.clone(), b.id.clone());
        repo.save(a);
        repo.save(b);

        // b depends on a; a -> b would close the loop
        assert!(would_create_cycle(&repo, &a_id, &b_id));
    }

    #[test]
    fn transitive_cycle_detected() {
        let mut repo = TaskRepository::new();
        let a = make_task("A");
        let mut b = make_task("B");
        let mut c = make_task("C");
        b.add_dependency(a.id.clone());
        c.add_dependency(b.id.clone());
        let (a_id, c_id) = (a.id.clone(), c.id.clone());
        repo.save(a);
        repo.save(b);
        repo.save(c);

        // c -> b -> a already exists, so a -> c closes a cycle
        assert!(would_create_cycle(&repo, &a_id, &c_id));
        assert!(matches!(
            check_acyclic(&repo, &a_id, &c_id),
            Err(TaskError::DependencyCycle(_, _))
        ));
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let mut repo = TaskRepository::new();
        let a = make_task("A");
        let a_id = a.id.clone();
        repo.save(a);

        assert!(would_create_cycle(&repo, &a_id, &a_id));
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let mut repo = TaskRepository::new();
        let root = make_task("Root");
        let mut left = make_task("Left");
        let mut right = make_task("Right");
        let top = make_task("Top");
        left.add_dependency(root.id.clone());
        right.add_dependency(root.id.clone());
        let (left_id, right_id, top_id) = (left.id.clone(), right.id.clone(), top.id.clone());
        repo.save(root);
        repo.save(left);
        repo.save(right);
        repo.save(top);

        assert!(!would_create_cycle(&repo, &top_id, &left_id));
        assert!(!would_create_cycle(&repo, &top_id, &right_id));
        assert!(!would_create_cycle(&repo, &left_id, &right_id));
    }
}
