//! Pending task registry
//!
//! Index of tasks being waited on, keyed by blueprint then task:
//!
//! ```text
//! blueprint_1 -> { task_abc -> waiter, task_def -> waiter }
//! blueprint_2 -> { task_uvw -> waiter }
//! ```
//!
//! A blueprint entry exists only while it has at least one task. The
//! registry does no locking of its own; the monitor loop is its only user.

use crate::models::{ObjectId, TaskId};
use std::collections::HashMap;

/// Blueprint id -> task id -> waiter
#[derive(Debug)]
pub struct PendingTasks<W> {
    by_blueprint: HashMap<ObjectId, HashMap<TaskId, W>>,
}

impl<W> Default for PendingTasks<W> {
    fn default() -> Self {
        Self {
            by_blueprint: HashMap::new(),
        }
    }
}

impl<W> PendingTasks<W> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a waiter. Re-adding the same pair replaces the earlier waiter,
    /// which is handed back to the caller.
    pub fn add(&mut self, blueprint_id: ObjectId, task_id: TaskId, waiter: W) -> Option<W> {
        self.by_blueprint
            .entry(blueprint_id)
            .or_default()
            .insert(task_id, waiter)
    }

    /// Remove a waiter, dropping the blueprint entry once its last task is
    /// gone. Absent blueprint or task is a no-op.
    pub fn remove(&mut self, blueprint_id: &ObjectId, task_id: &TaskId) -> Option<W> {
        let tasks = self.by_blueprint.get_mut(blueprint_id)?;
        let waiter = tasks.remove(task_id);
        if tasks.is_empty() {
            self.by_blueprint.remove(blueprint_id);
        }
        waiter
    }

    /// True when nothing is pending
    pub fn is_empty(&self) -> bool {
        self.by_blueprint.is_empty()
    }

    /// Number of blueprints with pending tasks
    pub fn blueprint_count(&self) -> usize {
        self.by_blueprint.len()
    }

    /// Number of pending tasks across all blueprints
    pub fn task_count(&self) -> usize {
        self.by_blueprint.values().map(HashMap::len).sum()
    }

    /// Blueprints with pending tasks, sorted
    pub fn blueprints(&self) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self.by_blueprint.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Pending task ids of one blueprint, sorted. Empty if the blueprint is
    /// unknown.
    pub fn tasks_for_blueprint(&self, blueprint_id: &ObjectId) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = self
            .by_blueprint
            .get(blueprint_id)
            .map(|tasks| tasks.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    /// True when the blueprint has at least one pending task
    pub fn contains_blueprint(&self, blueprint_id: &ObjectId) -> bool {
        self.by_blueprint.contains_key(blueprint_id)
    }

    /// True when this exact pair is pending
    pub fn contains(&self, blueprint_id: &ObjectId, task_id: &TaskId) -> bool {
        self.by_blueprint
            .get(blueprint_id)
            .is_some_and(|tasks| tasks.contains_key(task_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bp(s: &str) -> ObjectId {
        ObjectId::from(s)
    }

    fn task(s: &str) -> TaskId {
        TaskId::from(s)
    }

    #[test]
    fn test_add_creates_blueprint_entry() {
        let mut pending = PendingTasks::new();
        assert!(pending.is_empty());

        assert!(pending.add(bp("b1"), task("t1"), 1).is_none());
        pending.add(bp("b1"), task("t2"), 2);
        pending.add(bp("b2"), task("t3"), 3);

        assert_eq!(pending.blueprint_count(), 2);
        assert_eq!(pending.task_count(), 3);
        assert_eq!(pending.tasks_for_blueprint(&bp("b1")), vec![task("t1"), task("t2")]);
        assert_eq!(pending.blueprints(), vec![bp("b1"), bp("b2")]);
    }

    #[test]
    fn test_add_same_pair_last_write_wins() {
        let mut pending = PendingTasks::new();
        pending.add(bp("b1"), task("t1"), "first");

        let previous = pending.add(bp("b1"), task("t1"), "second");
        assert_eq!(previous, Some("first"));
        assert_eq!(pending.task_count(), 1);
        assert_eq!(pending.remove(&bp("b1"), &task("t1")), Some("second"));
    }

    #[test]
    fn test_remove_prunes_empty_blueprint() {
        let mut pending = PendingTasks::new();
        pending.add(bp("b1"), task("t1"), ());
        pending.add(bp("b1"), task("t2"), ());

        pending.remove(&bp("b1"), &task("t1"));
        assert!(pending.contains_blueprint(&bp("b1")));
        assert!(!pending.contains(&bp("b1"), &task("t1")));

        pending.remove(&bp("b1"), &task("t2"));
        assert!(!pending.contains_blueprint(&bp("b1")));
        assert!(pending.is_empty());
        assert_eq!(pending.blueprint_count(), 0);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut pending = PendingTasks::new();
        pending.add(bp("b1"), task("t1"), ());
        pending.add(bp("b1"), task("t2"), ());

        assert!(pending.remove(&bp("b1"), &task("t1")).is_some());
        assert!(pending.remove(&bp("b1"), &task("t1")).is_none());
        assert!(pending.remove(&bp("nope"), &task("t1")).is_none());

        // unknown task under a live blueprint leaves the blueprint alone
        assert!(pending.remove(&bp("b1"), &task("nope")).is_none());
        assert_eq!(pending.tasks_for_blueprint(&bp("b1")), vec![task("t2")]);
    }

    #[test]
    fn test_tasks_for_unknown_blueprint_is_empty() {
        let pending: PendingTasks<()> = PendingTasks::new();
        assert!(pending.tasks_for_blueprint(&bp("b9")).is_empty());
    }
}
