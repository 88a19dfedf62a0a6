// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory task store.
//!
//! Insertion-ordered so backlog re-dispatch and replication see tasks in
//! submission order. Tasks are never removed.

use gaffer_core::{Task, TaskId, TaskStatus, WorkerId};
use indexmap::IndexMap;
use parking_lot::Mutex;

#[derive(Default)]
pub struct TaskStore {
    tasks: Mutex<IndexMap<TaskId, Task>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new record. Returns false (leaving the stored record
    /// untouched) when the id already exists; resubmission is idempotent.
    pub fn insert(&self, task: Task) -> bool {
        let mut tasks = self.tasks.lock();
        if tasks.contains_key(task.id.as_str()) {
            return false;
        }
        tasks.insert(task.id.clone(), task);
        true
    }

    pub fn get(&self, id: &TaskId) -> Option<Task> {
        self.tasks.lock().get(id.as_str()).cloned()
    }

    /// Atomic per-task mutation. Returns the closure's result, or None for
    /// an unknown id.
    pub fn update<R>(&self, id: &TaskId, f: impl FnOnce(&mut Task) -> R) -> Option<R> {
        self.tasks.lock().get_mut(id.as_str()).map(f)
    }

    /// Ids of tasks in `status`, in submission order.
    pub fn by_status(&self, status: TaskStatus) -> Vec<TaskId> {
        self.tasks
            .lock()
            .values()
            .filter(|t| t.status == status)
            .map(|t| t.id.clone())
            .collect()
    }

    /// Ids of RUNNING tasks assigned to `worker`, as a stable snapshot for
    /// the failure-redistribution loop.
    pub fn assigned_running(&self, worker: &WorkerId) -> Vec<TaskId> {
        self.tasks
            .lock()
            .values()
            .filter(|t| t.status == TaskStatus::Running && t.worker_id.as_ref() == Some(worker))
            .map(|t| t.id.clone())
            .collect()
    }

    /// Deep copy of every record, in submission order, for replication.
    pub fn snapshot(&self) -> IndexMap<TaskId, Task> {
        self.tasks.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
