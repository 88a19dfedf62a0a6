// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Standby receiver and failover detector.
//!
//! The standby holds the last snapshot the primary pushed and watches the
//! silence. After `T_fo` without a snapshot it probes the primary's
//! client and worker ports; only when both refuse does it declare
//! failover. Promotion is operator-driven: the process prints a banner
//! with the retained state and exits.

use std::time::{Duration, Instant};

use gaffer_core::{Deadline, TaskStatus};
use gaffer_wire::{Envelope, Message, ProtocolError, StateSnapshot};
use parking_lot::Mutex;
use tokio::io::AsyncRead;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// How long a liveness probe waits for a TCP connect.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Replicated view of the primary's global state.
#[derive(Default)]
pub struct ReplicaState {
    snapshot: Mutex<StateSnapshot>,
}

impl ReplicaState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the replica with a freshly received snapshot.
    pub fn apply(&self, snapshot: StateSnapshot) {
        *self.snapshot.lock() = snapshot;
    }

    pub fn latest(&self) -> StateSnapshot {
        self.snapshot.lock().clone()
    }

    /// One-line operator summary for logs and the failover banner.
    pub fn summary(&self) -> String {
        let snapshot = self.snapshot.lock();
        format!(
            "{} tasks ({} waiting, {} running, {} done), {} workers, clock {}",
            snapshot.tasks.len(),
            snapshot.count_status(TaskStatus::Waiting),
            snapshot.count_status(TaskStatus::Running),
            snapshot.count_status(TaskStatus::Done),
            snapshot.workers.len(),
            snapshot.clock,
        )
    }
}

/// Failover phases: healthy replication, silence past the deadline, and
/// the terminal declared-failover state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandbyPhase {
    Replicating,
    Suspect,
    FailedOver,
}

gaffer_core::display_as! {
    StandbyPhase {
        StandbyPhase::Replicating => "replicating",
        StandbyPhase::Suspect => "suspect",
        StandbyPhase::FailedOver => "failed-over",
    }
}

/// Tracks snapshot silence and drives the REPLICATING ⇄ SUSPECT →
/// FAILED_OVER transitions. Probing itself is the caller's job, so the
/// decision logic stays synchronous and testable.
pub struct FailoverDetector {
    deadline: Deadline,
    phase: StandbyPhase,
}

impl FailoverDetector {
    pub fn new(now: Instant, timeout: Duration) -> Self {
        Self { deadline: Deadline::new(now, timeout), phase: StandbyPhase::Replicating }
    }

    /// A snapshot arrived; silence window restarts.
    pub fn record_sync(&mut self, now: Instant) {
        if self.phase != StandbyPhase::FailedOver {
            self.deadline.refresh(now);
            self.phase = StandbyPhase::Replicating;
        }
    }

    /// Periodic deadline check. Moves to SUSPECT once the snapshot
    /// silence outlives the failover allowance.
    pub fn assess(&mut self, now: Instant) -> StandbyPhase {
        if self.phase == StandbyPhase::Replicating && self.deadline.expired(now) {
            self.phase = StandbyPhase::Suspect;
        }
        self.phase
    }

    /// Outcome of probing the primary while SUSPECT. A reachable primary
    /// is a false alarm and resets the silence window; an unreachable one
    /// is terminal.
    pub fn resolve_probe(&mut self, now: Instant, primary_reachable: bool) -> StandbyPhase {
        if self.phase != StandbyPhase::Suspect {
            return self.phase;
        }
        if primary_reachable {
            self.record_sync(now);
        } else {
            self.phase = StandbyPhase::FailedOver;
        }
        self.phase
    }

    pub fn phase(&self) -> StandbyPhase {
        self.phase
    }
}

/// Apply SYNC_STATE frames from one primary connection until the stream
/// breaks. Each applied snapshot restarts the detector's silence window.
pub async fn receive_stream<R>(
    reader: &mut R,
    replica: &ReplicaState,
    detector: &Mutex<FailoverDetector>,
    now: impl Fn() -> Instant,
) -> Result<(), ProtocolError>
where
    R: AsyncRead + Unpin,
{
    loop {
        let envelope: Envelope = gaffer_wire::read_envelope(reader).await?;
        match envelope.message {
            Message::SyncState(snapshot) => {
                debug!(
                    tasks = snapshot.tasks.len(),
                    workers = snapshot.workers.len(),
                    clock = snapshot.clock,
                    "snapshot applied"
                );
                replica.apply(snapshot);
                detector.lock().record_sync(now());
            }
            other => {
                warn!(kind = %other, "unexpected message on replication stream, ignoring");
            }
        }
    }
}

/// Liveness probe: can anyone accept a TCP connection at `addr`?
pub async fn probe(addr: &str) -> bool {
    match tokio::time::timeout(PROBE_TIMEOUT, TcpStream::connect(addr)).await {
        Ok(Ok(_)) => {
            info!(%addr, "probe succeeded");
            true
        }
        _ => {
            warn!(%addr, "probe failed");
            false
        }
    }
}

#[cfg(test)]
#[path = "standby_tests.rs"]
mod tests;
