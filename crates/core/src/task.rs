// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task record and status state machine.

use crate::worker::WorkerId;
use serde::{Deserialize, Serialize};

crate::string_id! {
    /// Unique identifier for a task, supplied by the submitting client.
    ///
    /// Ids are unique across the orchestrator's lifetime; a resubmission of
    /// an existing id is treated as idempotent and leaves the stored record
    /// untouched.
    pub struct TaskId;
}

/// Lifecycle status of a task.
///
/// A task progresses `Waiting → Running → Done`, and drops back to
/// `Waiting` when its assigned worker is declared dead. `Failed` is part
/// of the wire contract but no orchestrator transition produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Queued, no worker assigned
    Waiting,
    /// Dispatched to a live worker
    Running,
    /// Completion reported by a worker
    Done,
    /// Terminal failure
    Failed,
}

impl TaskStatus {
    /// Check if this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Failed)
    }
}

crate::display_as! {
    TaskStatus {
        TaskStatus::Waiting => "waiting",
        TaskStatus::Running => "running",
        TaskStatus::Done => "done",
        TaskStatus::Failed => "failed",
    }
}

/// A unit of work submitted by a client.
///
/// `worker_id` is populated exactly while the task is `Running`; `lamport`
/// records the logical time of the last status-changing event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub client_id: String,
    pub payload: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<WorkerId>,
    pub lamport: u64,
}

impl Task {
    /// Create a fresh record in the `Waiting` state.
    pub fn new(id: impl Into<TaskId>, client_id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            client_id: client_id.into(),
            payload: payload.into(),
            status: TaskStatus::Waiting,
            worker_id: None,
            lamport: 0,
        }
    }

    /// Hand the task to a worker: `Waiting → Running`.
    pub fn assign(&mut self, worker: WorkerId, lamport: u64) {
        self.status = TaskStatus::Running;
        self.worker_id = Some(worker);
        self.lamport = lamport;
    }

    /// Return the task to the queue after its worker died: `Running → Waiting`.
    pub fn release(&mut self) {
        self.status = TaskStatus::Waiting;
        self.worker_id = None;
    }

    /// Record completion: `Running → Done`.
    pub fn complete(&mut self, lamport: u64) {
        self.status = TaskStatus::Done;
        self.worker_id = None;
        self.lamport = lamport;
    }

    /// Owner/status coherence: `Running` iff a worker is assigned.
    pub fn is_coherent(&self) -> bool {
        (self.status == TaskStatus::Running) == self.worker_id.is_some()
    }
}

/// Test builder: a plausible record whose status, owner, and timestamp
/// can be placed anywhere in the lifecycle.
#[cfg(any(test, feature = "test-support"))]
pub struct TaskBuilder {
    task: Task,
}

#[cfg(any(test, feature = "test-support"))]
impl Default for TaskBuilder {
    fn default() -> Self {
        Self { task: Task::new("task-1", "client-1", "payload") }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl TaskBuilder {
    pub fn status(mut self, status: TaskStatus) -> Self {
        self.task.status = status;
        self
    }

    pub fn worker_id(mut self, worker: impl Into<WorkerId>) -> Self {
        self.task.worker_id = Some(worker.into());
        self
    }

    pub fn lamport(mut self, lamport: u64) -> Self {
        self.task.lamport = lamport;
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Task {
    /// Create a builder with test defaults.
    pub fn builder() -> TaskBuilder {
        TaskBuilder::default()
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
