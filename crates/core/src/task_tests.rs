// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn new_task_is_waiting_with_no_owner() {
    let task = Task::new("task-abc", "cliente1", "x");
    assert_eq!(task.status, TaskStatus::Waiting);
    assert_eq!(task.worker_id, None);
    assert_eq!(task.lamport, 0);
    assert!(task.is_coherent());
}

#[test]
fn assign_moves_to_running_with_owner() {
    let mut task = Task::new("task-abc", "cliente1", "x");
    task.assign(WorkerId::new("w1"), 4);
    assert_eq!(task.status, TaskStatus::Running);
    assert_eq!(task.worker_id.as_ref().map(|w| w.as_str()), Some("w1"));
    assert_eq!(task.lamport, 4);
    assert!(task.is_coherent());
}

#[test]
fn release_returns_to_waiting_and_clears_owner() {
    let mut task = Task::builder()
        .status(TaskStatus::Running)
        .worker_id("w1")
        .lamport(4u64)
        .build();
    task.release();
    assert_eq!(task.status, TaskStatus::Waiting);
    assert_eq!(task.worker_id, None);
    // lamport of the last transition is stamped by the dispatcher
    assert!(task.is_coherent());
}

#[test]
fn complete_is_terminal_and_clears_owner() {
    let mut task = Task::builder()
        .status(TaskStatus::Running)
        .worker_id("w1")
        .lamport(4u64)
        .build();
    task.complete(9);
    assert_eq!(task.status, TaskStatus::Done);
    assert_eq!(task.worker_id, None);
    assert_eq!(task.lamport, 9);
    assert!(task.status.is_terminal());
    assert!(task.is_coherent());
}

#[test]
fn reassignment_after_release_is_allowed() {
    let mut task = Task::new("task-abc", "cliente1", "x");
    task.assign(WorkerId::new("w1"), 2);
    task.release();
    task.assign(WorkerId::new("w2"), 7);
    assert_eq!(task.status, TaskStatus::Running);
    assert_eq!(task.worker_id.as_ref().map(|w| w.as_str()), Some("w2"));
}

#[parameterized(
    waiting = { TaskStatus::Waiting, "waiting", false },
    running = { TaskStatus::Running, "running", false },
    done = { TaskStatus::Done, "done", true },
    failed = { TaskStatus::Failed, "failed", true },
)]
fn status_display_and_terminality(status: TaskStatus, display: &str, terminal: bool) {
    assert_eq!(status.to_string(), display);
    assert_eq!(status.is_terminal(), terminal);
}

#[test]
fn task_serde_roundtrip_preserves_owner() {
    let task = Task::builder()
        .status(TaskStatus::Running)
        .worker_id("w1")
        .lamport(3u64)
        .build();
    let json = serde_json::to_string(&task).unwrap();
    let back: Task = serde_json::from_str(&json).unwrap();
    assert_eq!(back, task);
}

#[test]
fn waiting_task_omits_worker_field() {
    let task = Task::new("task-abc", "cliente1", "x");
    let json = serde_json::to_string(&task).unwrap();
    assert!(!json.contains("worker_id"));
}
