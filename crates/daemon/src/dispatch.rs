// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Round-robin dispatch and worker-failure redistribution.
//!
//! Both entry points take the same lock: the cursor and a task's ownership
//! must never be touched by dispatch and failure handling concurrently.
//! Nothing here performs network I/O; handing an envelope to a worker is
//! an unbounded-channel send, drained by that worker's writer task.

use gaffer_core::{TaskId, TaskStatus, WorkerId};
use gaffer_wire::{Envelope, Message};
use tracing::{debug, info, warn};

use crate::state::Orchestrator;

impl Orchestrator {
    /// Try to hand a WAITING task to the next worker in the rotation.
    ///
    /// With no workers registered the task simply stays WAITING; the
    /// submission already succeeded from the client's point of view.
    pub fn dispatch_task(&self, id: &TaskId) {
        let _guard = self.dispatch_lock.lock();
        self.dispatch_locked(id);
    }

    /// Evict a worker and return its in-flight tasks to the queue.
    pub fn handle_worker_failure(&self, id: &WorkerId) {
        let _guard = self.dispatch_lock.lock();
        self.fail_worker_locked(id);
    }

    fn dispatch_locked(&self, id: &TaskId) {
        if self.tasks.get(id).map(|t| t.status) != Some(TaskStatus::Waiting) {
            return;
        }
        let Some((worker_id, sink)) = self.workers.next() else {
            debug!(task_id = %id, "no workers registered, task stays waiting");
            return;
        };

        let lamport = self.clock.tick();
        let Some(task) = self.tasks.update(id, |t| {
            t.assign(worker_id.clone(), lamport);
            t.clone()
        }) else {
            return;
        };

        let envelope = Envelope::new(Message::NewTask { task }, lamport);
        if sink.send(envelope).is_err() {
            // The worker's writer is gone; eviction requeues this task
            // (and any others it held) transitively.
            warn!(worker_id = %worker_id, task_id = %id, "send failed, evicting worker");
            self.fail_worker_locked(&worker_id);
            return;
        }

        info!(task_id = %id, worker_id = %worker_id, lamport, "task dispatched");
        self.replication.push();
    }

    fn fail_worker_locked(&self, id: &WorkerId) {
        if !self.workers.remove(id) {
            // Already evicted by a concurrent detector.
            return;
        }
        info!(worker_id = %id, "worker removed from pool");

        let orphaned = self.tasks.assigned_running(id);
        for task_id in &orphaned {
            self.tasks.update(task_id, |t| t.release());
            debug!(task_id = %task_id, worker_id = %id, "task returned to queue");
            self.dispatch_locked(task_id);
        }
        self.replication.push();
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
