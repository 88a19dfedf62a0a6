// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker session handler.
//!
//! AWAIT_REGISTER accepts only REGISTER_WORKER, after which the session
//! is ACTIVE: heartbeats refresh the liveness deadline, TASK_DONE
//! completes tasks, unknown kinds are logged and ignored. Outbound
//! traffic goes through an unbounded channel drained by a writer task,
//! so dispatch never writes to the socket directly. A transport error on
//! either half evicts the worker and redistributes its tasks.

use std::sync::Arc;
use std::time::Instant;

use gaffer_core::{TaskStatus, WorkerId};
use gaffer_wire::{Envelope, Message};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::ConnectionError;
use crate::state::Orchestrator;

pub(super) async fn handle(
    stream: TcpStream,
    orch: Arc<Orchestrator>,
) -> Result<(), ConnectionError> {
    let (mut reader, writer) = stream.into_split();

    // AWAIT_REGISTER: the first frame must be REGISTER_WORKER
    let envelope = gaffer_wire::read_envelope(&mut reader).await?;
    if envelope.lamport > 0 {
        orch.clock.merge(envelope.lamport);
    }
    let worker_id = match envelope.message {
        Message::RegisterWorker { worker_id } => worker_id,
        other => {
            warn!(kind = %other, "expected REGISTER_WORKER, closing");
            return Ok(());
        }
    };

    let (sink, outbox) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    spawn_writer(worker_id.clone(), writer, outbox, cancel.clone(), Arc::clone(&orch));

    orch.workers.add(worker_id.clone(), sink, Instant::now(), cancel.clone());
    info!(worker_id = %worker_id, pool = orch.workers.len(), "worker registered");
    orch.replication.push();

    // Newcomers absorb the backlog, in submission order.
    for task_id in orch.tasks.by_status(TaskStatus::Waiting) {
        orch.dispatch_task(&task_id);
    }

    // ACTIVE
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(worker_id = %worker_id, "session cancelled by eviction");
                return Ok(());
            }
            received = gaffer_wire::read_envelope(&mut reader) => {
                let envelope = match received {
                    Ok(envelope) => envelope,
                    Err(e) => {
                        warn!(worker_id = %worker_id, error = %e, "worker transport lost");
                        orch.handle_worker_failure(&worker_id);
                        return Ok(());
                    }
                };
                handle_message(&orch, &worker_id, envelope);
            }
        }
    }
}

fn handle_message(orch: &Orchestrator, worker_id: &WorkerId, envelope: Envelope) {
    if envelope.lamport > 0 {
        orch.clock.merge(envelope.lamport);
    }
    match envelope.message {
        Message::Heartbeat { .. } => {
            // Heartbeats carry no timestamp; a local tick keeps the clock
            // moving past them.
            orch.clock.tick();
            orch.workers.touch(worker_id, Instant::now());
            debug!(worker_id = %worker_id, "heartbeat");
        }
        Message::TaskDone { task: done } => {
            let lamport = orch.clock.merge(done.lamport);
            let updated = orch.tasks.update(&done.id, |t| t.complete(lamport));
            if updated.is_some() {
                info!(task_id = %done.id, worker_id = %worker_id, lamport, "task done");
                orch.replication.push();
            } else {
                warn!(task_id = %done.id, worker_id = %worker_id, "completion for unknown task");
            }
        }
        other => {
            warn!(worker_id = %worker_id, kind = %other, "unexpected message from worker, ignoring");
        }
    }
}

/// Drain the worker's outbox onto the socket. A write failure evicts the
/// worker, which requeues its in-flight tasks.
fn spawn_writer(
    worker_id: WorkerId,
    mut writer: OwnedWriteHalf,
    mut outbox: mpsc::UnboundedReceiver<Envelope>,
    cancel: CancellationToken,
    orch: Arc<Orchestrator>,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                queued = outbox.recv() => {
                    let Some(envelope) = queued else { return };
                    if let Err(e) = gaffer_wire::write_envelope(&mut writer, &envelope).await {
                        warn!(worker_id = %worker_id, error = %e, "write to worker failed");
                        orch.handle_worker_failure(&worker_id);
                        return;
                    }
                }
            }
        }
    });
}
