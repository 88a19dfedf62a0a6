// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::{Duration, Instant};

use gaffer_core::{Task, WorkerId};
use parking_lot::Mutex;

use super::*;

const T_FO: Duration = Duration::from_secs(15);

fn snapshot_with(task_ids: &[&str], clock: u64) -> StateSnapshot {
    let mut snapshot = StateSnapshot { clock, ..Default::default() };
    for id in task_ids {
        snapshot.tasks.insert((*id).into(), Task::new(*id, "cliente1", "x"));
    }
    snapshot.workers = vec![WorkerId::new("w1")];
    snapshot
}

#[test]
fn apply_overwrites_previous_snapshot() {
    let replica = ReplicaState::new();
    replica.apply(snapshot_with(&["task-a"], 3));
    replica.apply(snapshot_with(&["task-a", "task-b"], 8));

    let latest = replica.latest();
    assert_eq!(latest.tasks.len(), 2);
    assert_eq!(latest.clock, 8);
    assert!(replica.summary().contains("2 tasks"));
}

#[test]
fn detector_stays_replicating_inside_the_deadline() {
    let start = Instant::now();
    let mut detector = FailoverDetector::new(start, T_FO);

    assert_eq!(detector.assess(start + T_FO - Duration::from_secs(1)), StandbyPhase::Replicating);
}

#[test]
fn detector_turns_suspect_after_the_deadline() {
    let start = Instant::now();
    let mut detector = FailoverDetector::new(start, T_FO);

    assert_eq!(detector.assess(start + T_FO + Duration::from_secs(1)), StandbyPhase::Suspect);
}

#[test]
fn reachable_primary_is_a_false_alarm() {
    let start = Instant::now();
    let mut detector = FailoverDetector::new(start, T_FO);

    let probed = start + T_FO + Duration::from_secs(1);
    detector.assess(probed);
    assert_eq!(detector.resolve_probe(probed, true), StandbyPhase::Replicating);

    // Silence window restarted at the probe
    let almost = probed + T_FO - Duration::from_secs(1);
    assert_eq!(detector.assess(almost), StandbyPhase::Replicating);
}

#[test]
fn unreachable_primary_is_terminal() {
    let start = Instant::now();
    let mut detector = FailoverDetector::new(start, T_FO);

    let probed = start + T_FO + Duration::from_secs(1);
    detector.assess(probed);
    assert_eq!(detector.resolve_probe(probed, false), StandbyPhase::FailedOver);

    // Nothing resurrects a failed-over standby
    detector.record_sync(probed);
    assert_eq!(detector.phase(), StandbyPhase::FailedOver);
    assert_eq!(detector.assess(probed), StandbyPhase::FailedOver);
}

#[test]
fn snapshot_arrival_restarts_the_silence_window() {
    let start = Instant::now();
    let mut detector = FailoverDetector::new(start, T_FO);

    let synced = start + T_FO - Duration::from_secs(1);
    detector.record_sync(synced);
    let checked = synced + T_FO - Duration::from_secs(1);
    assert_eq!(detector.assess(checked), StandbyPhase::Replicating);
}

#[test]
fn resolve_probe_outside_suspect_changes_nothing() {
    let start = Instant::now();
    let mut detector = FailoverDetector::new(start, T_FO);
    assert_eq!(detector.resolve_probe(start, false), StandbyPhase::Replicating);
}

#[tokio::test]
async fn receive_stream_applies_snapshots_and_ignores_noise() {
    let (mut primary, mut standby) = tokio::io::duplex(4096);
    let replica = ReplicaState::new();
    let detector = Mutex::new(FailoverDetector::new(Instant::now(), T_FO));

    let first = snapshot_with(&["task-a"], 2);
    let second = snapshot_with(&["task-a", "task-b"], 5);
    gaffer_wire::write_envelope(&mut primary, &Envelope::new(Message::SyncState(first), 2))
        .await
        .unwrap();
    gaffer_wire::write_envelope(
        &mut primary,
        &Envelope::new(Message::Heartbeat { worker_id: "w1".into() }, 0),
    )
    .await
    .unwrap();
    gaffer_wire::write_envelope(
        &mut primary,
        &Envelope::new(Message::SyncState(second.clone()), 5),
    )
    .await
    .unwrap();
    drop(primary);

    let err = receive_stream(&mut standby, &replica, &detector, Instant::now)
        .await
        .unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
    assert_eq!(replica.latest(), second);
    assert_eq!(detector.lock().phase(), StandbyPhase::Replicating);
}
