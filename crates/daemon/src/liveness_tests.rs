// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::{Duration, Instant};

use gaffer_core::{Task, TaskStatus, WorkerId};
use gaffer_wire::Envelope;
use tokio::sync::mpsc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;

use super::sweep;
use crate::auth::AuthRegistry;
use crate::state::Orchestrator;

const TIMEOUT: Duration = Duration::from_secs(10);

fn orch() -> Orchestrator {
    Orchestrator::new(AuthRegistry::from_pairs(Vec::new()), TIMEOUT)
}

fn register_at(orch: &Orchestrator, id: &str, at: Instant) -> UnboundedReceiver<Envelope> {
    let (tx, rx) = mpsc::unbounded_channel();
    orch.workers.add(WorkerId::new(id), tx, at, CancellationToken::new());
    rx
}

#[test]
fn fresh_workers_survive_a_sweep() {
    let start = Instant::now();
    let orch = orch();
    let _rx = register_at(&orch, "w1", start);

    assert!(sweep(&orch, start + Duration::from_secs(9)).is_empty());
    assert_eq!(orch.workers.len(), 1);
}

#[test]
fn silent_worker_is_evicted_after_the_deadline() {
    let start = Instant::now();
    let orch = orch();
    let _rx = register_at(&orch, "w1", start);

    let evicted = sweep(&orch, start + Duration::from_secs(11));
    assert_eq!(evicted, vec![WorkerId::new("w1")]);
    assert!(orch.workers.is_empty());
}

#[test]
fn heartbeat_extends_the_deadline() {
    let start = Instant::now();
    let orch = orch();
    let _rx1 = register_at(&orch, "w1", start);
    let _rx2 = register_at(&orch, "w2", start);

    orch.workers.touch(&"w2".into(), start + Duration::from_secs(8));

    let evicted = sweep(&orch, start + Duration::from_secs(12));
    assert_eq!(evicted, vec![WorkerId::new("w1")]);
    assert_eq!(orch.workers.snapshot_ids(), vec![WorkerId::new("w2")]);
}

#[test]
fn eviction_requeues_in_flight_tasks_to_survivors() {
    let start = Instant::now();
    let orch = orch();
    let mut rx1 = register_at(&orch, "w1", start);

    orch.tasks.insert(Task::new("task-a", "cliente1", "x"));
    orch.dispatch_task(&"task-a".into());
    assert!(rx1.try_recv().is_ok());

    // w2 arrives fresh while w1 has gone silent
    let later = start + Duration::from_secs(11);
    let mut rx2 = register_at(&orch, "w2", later);
    sweep(&orch, later);

    let task = orch.tasks.get(&"task-a".into()).unwrap();
    assert_eq!(task.status, TaskStatus::Running);
    assert_eq!(task.worker_id, Some(WorkerId::new("w2")));
    assert!(rx2.try_recv().is_ok());
    assert!(orch.tasks.assigned_running(&"w1".into()).is_empty());
}

#[test]
fn eviction_cancels_the_worker_session() {
    let start = Instant::now();
    let orch = orch();
    let (tx, _rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    orch.workers.add(WorkerId::new("w1"), tx, start, cancel.clone());

    sweep(&orch, start + Duration::from_secs(11));
    assert!(cancel.is_cancelled());
}
