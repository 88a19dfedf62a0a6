// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use gaffer_core::Task;
use gaffer_wire::{Envelope, Message, StateSnapshot};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

use super::spawn;
use crate::auth::AuthRegistry;
use crate::state::Orchestrator;

async fn recv_snapshot(stream: &mut TcpStream) -> StateSnapshot {
    let envelope: Envelope =
        tokio::time::timeout(Duration::from_secs(5), gaffer_wire::read_envelope(stream))
            .await
            .expect("timed out waiting for a snapshot")
            .unwrap();
    match envelope.message {
        Message::SyncState(snapshot) => snapshot,
        other => panic!("expected SYNC_STATE, got {other}"),
    }
}

#[tokio::test]
async fn connect_push_and_reconnect_deliver_current_state() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let orch = Arc::new(Orchestrator::new(AuthRegistry::from_pairs(Vec::new()), Duration::from_secs(10)));
    orch.tasks.insert(Task::new("task-a", "cliente1", "x"));

    let cancel = CancellationToken::new();
    let _sender = spawn(Arc::clone(&orch), addr, Duration::from_millis(50), cancel.clone());

    // Full snapshot arrives immediately on connect
    let (mut stream, _) = listener.accept().await.unwrap();
    let first = recv_snapshot(&mut stream).await;
    assert!(first.tasks.contains_key("task-a"));

    // A nudge pushes a fresh snapshot with the latest contents
    orch.tasks.insert(Task::new("task-b", "cliente1", "y"));
    orch.replication.push();
    let second = recv_snapshot(&mut stream).await;
    assert_eq!(second, orch.snapshot());
    assert_eq!(second.tasks.len(), 2);

    // After the stream dies the sender reconnects and resends everything.
    // Keep nudging so the dead socket is actually written to.
    drop(stream);
    let accept = listener.accept();
    tokio::pin!(accept);
    let mut reconnected = None;
    for _ in 0..400 {
        tokio::select! {
            result = &mut accept => {
                reconnected = Some(result.unwrap().0);
                break;
            }
            _ = tokio::time::sleep(Duration::from_millis(20)) => {
                orch.replication.push();
            }
        }
    }
    let mut stream = reconnected.expect("sender never reconnected");
    let third = recv_snapshot(&mut stream).await;
    assert_eq!(third.tasks.len(), 2);

    cancel.cancel();
}
