// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replication sender: streams state snapshots to the standby.
//!
//! Best-effort and strictly off the hot path: mutating code calls
//! [`ReplicationHandle::push`], which only nudges the background task.
//! The task builds a fresh snapshot per send, so coalesced nudges still
//! replicate the latest state. Lost connections are retried with a fixed
//! backoff, and every (re)connect starts with a full snapshot.

use std::sync::Arc;
use std::time::Duration;

use gaffer_wire::{Envelope, Message, ProtocolError};
use tokio::net::TcpStream;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::state::Orchestrator;

/// Handle through which state-mutating code requests a snapshot push.
pub struct ReplicationHandle {
    notify: Arc<Notify>,
}

impl ReplicationHandle {
    pub fn new() -> Self {
        Self { notify: Arc::new(Notify::new()) }
    }

    /// Request a push. Never blocks; without a connected standby this is a
    /// no-op beyond storing a wakeup permit.
    pub fn push(&self) {
        self.notify.notify_one();
    }

    pub(crate) async fn wait(&self) {
        self.notify.notified().await;
    }
}

impl Default for ReplicationHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the replication connection loop until cancelled.
pub fn spawn(
    orch: Arc<Orchestrator>,
    standby_addr: String,
    backoff: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                connected = TcpStream::connect(&standby_addr) => match connected {
                    Ok(mut stream) => {
                        info!(standby = %standby_addr, "replication stream established");
                        if let Err(e) = stream_snapshots(&orch, &mut stream, &cancel).await {
                            warn!(standby = %standby_addr, error = %e, "replication stream lost");
                        } else {
                            return;
                        }
                    }
                    Err(e) => {
                        debug!(standby = %standby_addr, error = %e, "standby unreachable");
                    }
                },
            }
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(backoff) => {}
            }
        }
    })
}

/// Push a full snapshot, then one more after every nudge, until the stream
/// breaks or shutdown. `Ok` means cancelled.
async fn stream_snapshots(
    orch: &Orchestrator,
    stream: &mut TcpStream,
    cancel: &CancellationToken,
) -> Result<(), ProtocolError> {
    send_snapshot(orch, stream).await?;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            _ = orch.replication.wait() => send_snapshot(orch, stream).await?,
        }
    }
}

async fn send_snapshot(orch: &Orchestrator, stream: &mut TcpStream) -> Result<(), ProtocolError> {
    let snapshot = orch.snapshot();
    let lamport = snapshot.clock;
    debug!(tasks = snapshot.tasks.len(), workers = snapshot.workers.len(), lamport, "pushing snapshot");
    gaffer_wire::write_envelope(stream, &Envelope::new(Message::SyncState(snapshot), lamport)).await
}

#[cfg(test)]
#[path = "replicate_tests.rs"]
mod tests;
